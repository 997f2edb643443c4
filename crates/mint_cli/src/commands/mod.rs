pub mod add_doc;
pub mod balance;
pub mod documents;
pub mod download;
pub mod preview;
pub mod rebuild;
pub mod resolve;
pub mod signup;
pub mod withdraw;
pub mod withdrawals;
