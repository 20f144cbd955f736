pub mod bar;
pub mod quote;
pub mod request_params;
pub mod timeframe;
pub mod widgets;
