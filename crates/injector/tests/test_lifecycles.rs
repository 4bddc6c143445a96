mod common;

use std::sync::Arc;
use std::thread;

use common::{database_config, init_test_logging, CallCounter, Database, DatabaseConfig, UserRepository};
use injector::{Injector, InjectorConfig, InjectorError, TypeToken};

#[test]
fn test_singleton_and_transient_end_to_end() {
    init_test_logging();
    let injector = Injector::new();
    let singleton_calls = CallCounter::new();
    let transient_calls = CallCounter::new();

    // Arrange
    let counter = singleton_calls.clone();
    injector
        .singleton(move || -> anyhow::Result<u64> {
            counter.hit();
            Ok(42)
        })
        .expect("singleton registers");
    let counter = transient_calls.clone();
    injector
        .transient_named(
            move || -> anyhow::Result<u64> {
                counter.hit();
                Ok(42)
            },
            "fresh",
        )
        .expect("transient registers");

    // Act
    let first = injector.inject::<u64>().expect("singleton resolves");
    let second = injector.inject::<u64>().expect("singleton resolves again");
    let a = injector.inject_named::<u64>("fresh").expect("transient resolves");
    let b = injector.inject_named::<u64>("fresh").expect("transient resolves again");

    // Assert
    assert_eq!((*first, *second, *a, *b), (42, 42, 42, 42));
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(singleton_calls.get(), 1);
    assert_eq!(transient_calls.get(), 2);
}

#[test]
fn test_dependency_graph_resolves_through_parameters() {
    init_test_logging();
    let injector = Injector::new();
    let generations = CallCounter::new();

    injector
        .singleton(|| -> anyhow::Result<DatabaseConfig> { Ok(database_config("sqlite://memory")) })
        .expect("config registers");
    let counter = generations.clone();
    injector
        .singleton(move |config: Arc<DatabaseConfig>| -> anyhow::Result<Database> {
            Ok(Database {
                url: config.url.clone(),
                generation: counter.hit(),
            })
        })
        .expect("database registers");
    injector
        .transient(|db: Arc<Database>| -> anyhow::Result<UserRepository> { Ok(UserRepository { db }) })
        .expect("repository registers");

    let first = injector.inject::<UserRepository>().expect("repository resolves");
    let second = injector.inject::<UserRepository>().expect("repository resolves again");

    assert_eq!(first.db.url, "sqlite://memory");
    assert!(Arc::ptr_eq(&first.db, &second.db));
    assert_eq!(generations.get(), 1);
}

#[test]
fn test_singleton_failure_is_retried() {
    init_test_logging();
    let injector = Injector::new();
    let attempts = CallCounter::new();

    let counter = attempts.clone();
    injector
        .singleton(move || -> anyhow::Result<Database> {
            let attempt = counter.hit();
            if attempt == 1 {
                anyhow::bail!("connection refused");
            }
            Ok(Database {
                url: "postgres://db".to_string(),
                generation: attempt,
            })
        })
        .expect("singleton registers");

    let err = injector.inject::<Database>().unwrap_err();
    assert!(matches!(err, InjectorError::FactoryFailed { .. }));
    assert!(err.to_string().contains("connection refused"));

    let db = injector.inject::<Database>().expect("second attempt succeeds");
    assert_eq!(db.generation, 2);
    let again = injector.inject::<Database>().expect("cached");
    assert!(Arc::ptr_eq(&db, &again));
    assert_eq!(attempts.get(), 2);
}

#[test]
fn test_panicking_recipe_is_contained() {
    init_test_logging();
    let injector = Injector::new();
    injector
        .transient(|| -> anyhow::Result<Database> { panic!("pool exhausted") })
        .expect("registers");

    let err = injector.inject::<Database>().unwrap_err();
    match err {
        InjectorError::FactoryAborted {
            service_type,
            payload,
        } => {
            assert!(service_type.ends_with("Database"));
            assert_eq!(payload, "pool exhausted");
        }
        other => panic!("expected FactoryAborted, got {other:?}"),
    }

    // Реестр продолжает работать после panic
    injector
        .transient(|| -> anyhow::Result<Database> {
            Ok(Database {
                url: "recovered".to_string(),
                generation: 0,
            })
        })
        .expect("re-registers");
    assert_eq!(injector.inject::<Database>().expect("resolves").url, "recovered");
}

#[test]
fn test_unit_output_is_rejected() {
    let injector = Injector::new();
    let err = injector.transient(|| -> anyhow::Result<()> { Ok(()) }).unwrap_err();
    assert!(matches!(err, InjectorError::WrongReturnArity { found: 0, .. }));
    assert!(injector.registered_keys().is_empty());
}

#[test]
fn test_concurrent_singleton_resolution_builds_once() {
    init_test_logging();
    let injector = Injector::new();
    let builds = CallCounter::new();

    let counter = builds.clone();
    injector
        .singleton(move || -> anyhow::Result<Database> {
            let generation = counter.hit();
            thread::sleep(std::time::Duration::from_millis(20));
            Ok(Database {
                url: "shared".to_string(),
                generation,
            })
        })
        .expect("registers");

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let injector = injector.clone();
            thread::spawn(move || injector.inject::<Database>().expect("resolves"))
        })
        .collect();
    let results: Vec<Arc<Database>> = handles
        .into_iter()
        .map(|h| h.join().expect("resolver thread should not panic"))
        .collect();

    assert_eq!(builds.get(), 1);
    assert!(results.iter().all(|db| Arc::ptr_eq(db, &results[0])));
}

#[test]
fn test_token_resolution_and_stats() {
    init_test_logging();
    let injector = Injector::with_config(
        InjectorConfig::default()
            .with_name("stats")
            .with_verbose_logging(true),
    );
    injector
        .singleton(|| -> anyhow::Result<DatabaseConfig> { Ok(database_config("mem")) })
        .expect("registers");

    let token = TypeToken::of::<DatabaseConfig>();
    let erased = injector.inject_token(token).expect("resolves by token");
    assert!(erased.downcast_ref::<DatabaseConfig>().is_some());
    assert!(injector.inject_token_named(token, "other").unwrap_err().is_not_found());

    let stats = injector.stats();
    assert_eq!(stats.name, "stats");
    assert_eq!(stats.registered, 1);
    assert_eq!(stats.resolutions, 2);
    assert_eq!(stats.failed_resolutions, 1);
}

#[test]
fn test_same_type_name_from_another_type_is_mismatch() {
    init_test_logging();
    let injector = Injector::new();

    let registered = {
        #[allow(dead_code)]
        struct Marker(u8);

        injector
            .singleton(|| -> anyhow::Result<Marker> { Ok(Marker(1)) })
            .expect("registers");
        std::any::type_name::<Marker>()
    };

    {
        #[allow(dead_code)]
        struct Marker(u16);

        // Разные типы, одно отображаемое имя и один ключ
        assert_eq!(std::any::type_name::<Marker>(), registered);
        assert!(injector.is_registered::<Marker>());

        let err = injector
            .inject::<Marker>()
            .err()
            .expect("stored value has a different type");
        match err {
            InjectorError::TypeMismatch { expected, key } => {
                assert_eq!(expected, registered);
                assert_eq!(key, TypeToken::of::<Marker>().key().to_string());
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }
}
