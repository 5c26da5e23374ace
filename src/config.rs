use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: String,
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
    /// Base64-encoded HS256 secret.
    #[envconfig(from = "JWT_SECRET")]
    pub jwt_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn database_url_is_required() {
        let env = vars(&[("JWT_SECRET", "c2VjcmV0")]);
        assert!(Config::init_from_hashmap(&env).is_err());
    }

    #[test]
    fn port_defaults_to_8080() {
        let env = vars(&[
            ("DATABASE_URL", "postgres://localhost/sponity"),
            ("JWT_SECRET", "c2VjcmV0"),
        ]);
        let config = Config::init_from_hashmap(&env).unwrap();
        assert_eq!(config.db_url, "postgres://localhost/sponity");
        assert_eq!(config.port, 8080);
    }
}
