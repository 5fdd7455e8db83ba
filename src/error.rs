use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("no library root configured; set library.root or pass --root")]
    NoLibraryRoot,
    #[display("could not open library at {}", _0.display())]
    Library(#[error(not(source))] PathBuf),
    #[display("could not open checkpoint database {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    #[display("could not load date dictionary {}", _0.display())]
    Dictionary(#[error(not(source))] PathBuf),
    #[display("exiftool is required but could not be found")]
    Exiftool,
    #[display("invalid path template")]
    Template,
    #[display("{_0} failed")]
    Command(#[error(not(source))] &'static str),
}
