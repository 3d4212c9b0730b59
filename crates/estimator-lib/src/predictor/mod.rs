//! ML prediction engine

mod features;
mod inference;
mod output;

pub use features::{encode, encode_query};
pub use inference::{predict, PredictionResult};
pub use output::{round_price, PRICE_DECIMALS};
