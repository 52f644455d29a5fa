pub mod auth_grant;
pub mod auth_token;
pub mod connect;
pub mod disconnect;
pub mod ping;
pub mod server_auth_token;
