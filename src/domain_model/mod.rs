mod credencial;
mod estado;
mod usuario;

pub use credencial::*;
pub use estado::*;
pub use usuario::*;
