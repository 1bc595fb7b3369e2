pub mod php_file;

pub use php_file::PhpFile;
