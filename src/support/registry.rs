use ::std::any::Any;
use ::std::collections::HashMap;
use ::std::fmt;
use ::std::fmt::Debug;
use ::std::sync::Arc;

use crate::Error;
use crate::HttpServerFactory;
use crate::RequestResponseProcessorFactory;

/// Key for the `RestTestConfig`.
pub const REST_TEST_CONFIGURATION_KEY: &'static str = &"restTestConfiguration";

/// Key for the `RestMockRequestBuilder`.
pub const HTTP_REQUEST_BUILDER_KEY: &'static str = &"restMockHttpRequestBuilder";

/// Key for an `Arc<dyn HttpServerFactory>`.
pub const HTTP_SERVER_FACTORY_KEY: &'static str = &"httpServerFactory";

/// Key for an `Arc<dyn RequestResponseProcessorFactory>`.
pub const PROCESSOR_FACTORY_KEY: &'static str = &"processorFactory";

///
/// Named components a `RestTestSupport` is assembled from.
///
/// Components are looked up by name, and by type.
/// Asking for a name which holds a different type is the same as it being missing.
///
/// ```rust
/// use ::resttest::ComponentRegistry;
/// use ::resttest::RestTestConfig;
/// use ::resttest::REST_TEST_CONFIGURATION_KEY;
///
/// let registry = ComponentRegistry::new()
///     .register(REST_TEST_CONFIGURATION_KEY, RestTestConfig::default());
///
/// let config = registry.get::<RestTestConfig>(REST_TEST_CONFIGURATION_KEY).unwrap();
/// assert_eq!(config.http_version, "HTTP/1.1");
/// ```
///
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the component under the name, replacing anything already there.
    pub fn register<T>(mut self, key: &str, component: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(key, component);
        self
    }

    pub fn insert<T>(&mut self, key: &str, component: T)
    where
        T: Any + Send + Sync,
    {
        self.components.insert(key.to_string(), Arc::new(component));
    }

    pub fn register_server_factory<F>(self, factory: F) -> Self
    where
        F: HttpServerFactory + 'static,
    {
        let factory: Arc<dyn HttpServerFactory> = Arc::new(factory);
        self.register(HTTP_SERVER_FACTORY_KEY, factory)
    }

    pub fn register_processor_factory<F>(self, factory: F) -> Self
    where
        F: RequestResponseProcessorFactory + 'static,
    {
        let factory: Arc<dyn RequestResponseProcessorFactory> = Arc::new(factory);
        self.register(PROCESSOR_FACTORY_KEY, factory)
    }

    pub fn find<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.components
            .get(key)
            .cloned()
            .and_then(|component| component.downcast::<T>().ok())
    }

    pub fn get<T>(&self, key: &str) -> Result<Arc<T>, Error>
    where
        T: Any + Send + Sync,
    {
        self.find(key).ok_or_else(|| Error::MissingComponent {
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }
}

impl Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.components.keys().collect();
        keys.sort();

        f.debug_struct("ComponentRegistry")
            .field("components", &keys)
            .finish()
    }
}

#[cfg(test)]
mod test_get {
    use super::*;

    use crate::NoopProcessor;

    #[test]
    fn it_should_return_registered_components() {
        let registry = ComponentRegistry::new().register("name", "terrance".to_string());

        assert_eq!(*registry.get::<String>("name").unwrap(), "terrance");
        assert!(registry.contains("name"));
    }

    #[test]
    fn it_should_fail_on_missing_components() {
        let registry = ComponentRegistry::new();

        let err = registry.get::<String>("name").unwrap_err();

        assert_eq!(err.to_string(), "could not find component. name=[name].");
    }

    #[test]
    fn it_should_fail_on_components_of_another_type() {
        let registry = ComponentRegistry::new().register("name", 123_u32);

        assert!(registry.find::<String>("name").is_none());
        assert!(registry.get::<String>("name").is_err());
    }

    #[test]
    fn it_should_store_factories_as_trait_objects() {
        let registry = ComponentRegistry::new().register_processor_factory(NoopProcessor);

        assert!(registry
            .find::<Arc<dyn RequestResponseProcessorFactory>>(PROCESSOR_FACTORY_KEY)
            .is_some());
    }
}
