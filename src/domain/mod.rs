pub mod credentials;
pub mod email;
