pub mod lookup;
pub mod picker_url;
pub mod resolve;
