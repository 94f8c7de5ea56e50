//! Type-keyed singleton service registry.
//!
//! One live instance per service type, initialized exactly once, shared by
//! every consumer as an `Arc`. Registration and linking run in the
//! single-threaded setup phase before the server starts; after startup the
//! registry is read-only, so request handling needs no locking.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A singleton dependency with an initialization lifecycle.
///
/// `init` is invoked exactly once, when the instance is first installed.
/// `start`, `stop` and `clean` default to no-ops; they are reserved for the
/// server-lifecycle layer and never invoked by the registry itself.
pub trait Service: Any + Send + Sync {
    fn init(&mut self) -> Result<(), ServiceError>;

    fn start(&mut self) -> Result<(), ServiceError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ServiceError> {
        Ok(())
    }

    fn clean(&mut self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Error raised during service installation or linking.
///
/// These are configuration errors: they only occur during the setup phase
/// and abort startup, so they never surface as an HTTP response.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// A service's `init` hook failed.
    #[error("service {name} failed to initialize: {message}")]
    Init { name: &'static str, message: String },

    /// A dependency was resolved before anything installed it.
    #[error("no service of type {name} is registered")]
    Missing { name: &'static str },
}

impl ServiceError {
    /// Convenience for `init` implementations.
    pub fn init<S: Service>(message: impl Into<String>) -> Self {
        ServiceError::Init {
            name: std::any::type_name::<S>(),
            message: message.into(),
        }
    }
}

/// Registry of singleton service instances, keyed by type.
///
/// Populated incrementally during setup; nothing is ever removed. Two
/// consumers installing or resolving the same service type always share one
/// instance.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a service instance, initializing it exactly once.
    ///
    /// If an instance of the same type is already registered, the existing
    /// instance is returned and `svc` is dropped without its `init` running
    /// (first registration wins).
    pub fn install<S: Service>(&mut self, mut svc: S) -> Result<Arc<S>, ServiceError> {
        let name = std::any::type_name::<S>();
        if let Some(existing) = self.lookup::<S>() {
            debug!("Service {} already registered, keeping existing instance", name);
            return Ok(existing);
        }

        svc.init()?;
        let instance = Arc::new(svc);
        self.services
            .insert(TypeId::of::<S>(), instance.clone() as Arc<dyn Any + Send + Sync>);
        info!("Registered service: {}", name);
        Ok(instance)
    }

    /// Resolve an already-installed service.
    ///
    /// Missing services are a fatal configuration error; propagate the `Err`
    /// out of setup so startup aborts before any route is served.
    pub fn resolve<S: Service>(&self) -> Result<Arc<S>, ServiceError> {
        self.lookup::<S>().ok_or(ServiceError::Missing {
            name: std::any::type_name::<S>(),
        })
    }

    /// Resolve a service, installing `default` first if absent.
    ///
    /// This is the linking operation: dependents call it with a freshly
    /// constructed instance and always receive the shared singleton.
    pub fn link<S: Service>(&mut self, default: S) -> Result<Arc<S>, ServiceError> {
        self.install(default)
    }

    /// Whether a service of type `S` is registered.
    pub fn contains<S: Service>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn lookup<S: Service>(&self) -> Option<Arc<S>> {
        self.services
            .get(&TypeId::of::<S>())
            .and_then(|any| any.clone().downcast::<S>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingService {
        inits: Arc<AtomicUsize>,
        message: String,
    }

    impl Service for CountingService {
        fn init(&mut self) -> Result<(), ServiceError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            self.message = "hello".to_string();
            Ok(())
        }
    }

    struct FailingService;

    impl Service for FailingService {
        fn init(&mut self) -> Result<(), ServiceError> {
            Err(ServiceError::init::<FailingService>("boom"))
        }
    }

    #[derive(Debug)]
    struct OtherService;

    impl Service for OtherService {
        fn init(&mut self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn test_install_runs_init_once() {
        let inits = Arc::new(AtomicUsize::new(0));
        let mut registry = ServiceRegistry::new();

        let first = registry
            .install(CountingService {
                inits: inits.clone(),
                ..Default::default()
            })
            .unwrap();
        let second = registry
            .install(CountingService {
                inits: inits.clone(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.message, "hello");
    }

    #[test]
    fn test_resolve_shares_one_instance() {
        let mut registry = ServiceRegistry::new();
        let installed = registry.install(CountingService::default()).unwrap();
        let resolved = registry.resolve::<CountingService>().unwrap();
        assert!(Arc::ptr_eq(&installed, &resolved));
    }

    #[test]
    fn test_resolve_missing_is_configuration_error() {
        let registry = ServiceRegistry::new();
        let err = registry.resolve::<OtherService>().unwrap_err();
        assert!(err.to_string().contains("OtherService"));
    }

    #[test]
    fn test_failed_init_does_not_register() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.install(FailingService).is_err());
        assert!(!registry.contains::<FailingService>());
    }

    #[test]
    fn test_link_installs_when_absent() {
        let mut registry = ServiceRegistry::new();
        assert!(!registry.contains::<OtherService>());
        registry.link(OtherService).unwrap();
        assert!(registry.contains::<OtherService>());
    }
}
