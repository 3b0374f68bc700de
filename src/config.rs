#[derive(Clone, Debug, Default)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,

    // JSON object mapping phone numbers to granted permissions, e.g.
    // {"+15551234567": ["orders.view_order"]}. Unset means nothing is granted.
    pub permission_grants: Option<String>,

    pub bootstrap_superuser_username: Option<String>,
    pub bootstrap_superuser_phone: Option<String>,
    pub bootstrap_superuser_activate: bool,
}
