use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ContainerRequest, GenericImage, ImageExt};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Account and schema the url_mappings tests run against.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "snip".to_string())]
    database: String,
    #[builder(default = "snip".to_string())]
    username: String,
    #[builder(default = "snip".to_string())]
    password: String,
    #[builder(default = "8.4".to_string())]
    image_tag: String,
}

impl MysqlConfig {
    fn image(&self) -> ContainerRequest<GenericImage> {
        GenericImage::new("mysql", self.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", self.database.as_str())
            .with_env_var("MYSQL_USER", self.username.as_str())
            .with_env_var("MYSQL_PASSWORD", self.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
    }

    fn dsn(&self, host: &str, port: u16) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, host, port, self.database
        )
    }
}

/// A MySQL container that lives as long as this value.
///
/// "ready for connections" is logged once during init as well, so callers
/// should still retry their first connect.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = config.image().start().await?;
        Ok(Self { container, config })
    }

    /// sqlx DSN for the mapped host port.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(self.config.dsn(&host, port))
    }
}
