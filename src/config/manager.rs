use std::path::Path;
use config::ConfigError;
use tracing::{warn, debug};
use crate::config::types::ApplicationConfig;
use crate::config::loader::{ConfigLoader, Environment};
use crate::config::validation::Validator;

/// 初始化配置（在應用程序啟動時調用）
///
/// 配置以值的形式返回並由呼叫者顯式傳遞，不保存在全局狀態中。
pub fn init_config() -> Result<ApplicationConfig, ConfigError> {
    let app_config = ApplicationConfig::load_from_env()?;
    debug!("配置初始化成功，環境：{:?}", Environment::from_env());
    Ok(app_config)
}

/// ApplicationConfig 加載方法實現
impl ApplicationConfig {
    /// 從環境變數指定的環境加載配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        debug!("從環境加載配置: {:?}", env);
        Self::load(env)
    }

    /// 從指定環境加載配置
    pub fn load(env: Environment) -> Result<Self, ConfigError> {
        Self::finish(ConfigLoader::load(env)?)
    }

    /// 從指定文件加載配置
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        Self::finish(ConfigLoader::load_file(path)?)
    }

    fn finish(config_source: config::Config) -> Result<Self, ConfigError> {
        // 使用 serde 反序列化配置
        let app_config: ApplicationConfig = config_source.try_deserialize()?;

        if let Err(err) = app_config.validate() {
            warn!("配置驗證失敗: {}", err);
            return Err(ConfigError::Message(err.to_string()));
        }
        debug!("配置驗證通過");

        Ok(app_config)
    }
}
