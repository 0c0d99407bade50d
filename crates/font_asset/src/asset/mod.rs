pub mod bitmap;
pub mod charset;
pub mod container;
pub mod pack;
pub mod record;
pub mod sheet;
