pub mod ci;
pub mod test;
