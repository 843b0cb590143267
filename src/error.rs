/// Protocol-level command errors, reported to the client as `-ERR` lines.
///
/// These never close the connection and are never fatal; the `Display`
/// text is the reason sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("ERR args")]
    WrongArity,

    #[error("ERR int")]
    NotInteger,

    #[error("ERR unknown")]
    UnknownCommand,
}
