pub mod custom_users;
