pub mod activity;
pub mod intent;
