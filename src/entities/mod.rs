pub mod custom_user;
