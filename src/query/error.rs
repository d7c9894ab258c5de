use snafu::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QueryErr {
    #[snafu(display("empty command"))]
    Empty,
    #[snafu(display("unknown action {action:?}"))]
    UnknownAction { action: String },
    #[snafu(display("unexpected end of command, expected {expected}"))]
    UnexpectedEof { expected: String },
    #[snafu(display("expected {expected}, found {found:?}"))]
    UnexpectedToken { expected: String, found: String },
    #[snafu(display("unterminated quoted text"))]
    UnterminatedText,
    #[snafu(display("malformed pair {fragment:?}, expected <column>=<value>"))]
    MalformedCondition { fragment: String },
    /// `where a=1 and b=2`: pairs are separated by `,` only.
    #[snafu(display("pairs must be separated by ',' not 'and': {fragment:?}"))]
    AndSeparator { fragment: String },
    #[snafu(display("unexpected trailing input {fragment:?}"))]
    TrailingInput { fragment: String },
}
