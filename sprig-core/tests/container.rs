use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use sprig_core::prelude::*;
use sprig_core::{ComponentRegistry, ConfigurationMap, InjectionResolver};
use sprig_core_macros::Component;
use tempfile::NamedTempFile;

mod shop {
    use super::*;

    #[derive(Component, Default)]
    pub struct Inventory {
        #[inject(property = "inventory.capacity")]
        pub capacity: Option<u32>,

        #[inject(property = "inventory.warehouse")]
        pub warehouse: Option<String>,

        pub reserved: u32,
    }

    #[derive(Component, Default)]
    pub struct Checkout {
        #[inject]
        pub inventory: Option<Shared<Inventory>>,

        #[inject(property = "checkout.currency")]
        pub currency: Option<String>,
    }

    /// 没有注入点，启动时不会被创建
    #[derive(Component, Default)]
    pub struct AuditLog;

    pub mod pricing {
        use super::*;

        #[derive(Component)]
        #[component(constructor = PriceList::create)]
        pub struct PriceList {
            pub discount: f64,

            #[inject(property = "pricing.tax")]
            pub tax: Option<f64>,
        }

        impl PriceList {
            fn create() -> anyhow::Result<Self> {
                Ok(Self {
                    discount: 0.1,
                    tax: None,
                })
            }
        }
    }
}

mod cycle {
    use super::*;

    #[derive(Component, Default)]
    pub struct Left {
        #[inject]
        pub right: Option<Shared<Right>>,
    }

    #[derive(Component, Default)]
    pub struct Right {
        #[inject]
        pub left: Option<Shared<Left>>,

        #[inject]
        pub itself: Option<Shared<Right>>,
    }
}

mod broken {
    use super::*;

    #[derive(Component, Debug)]
    #[component(constructor = Unreachable::connect)]
    pub struct Unreachable {
        #[inject(property = "broken.host")]
        pub host: Option<String>,
    }

    impl Unreachable {
        fn connect() -> anyhow::Result<Self> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }
}

fn properties(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".properties")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_derive_generates_points_in_declaration_order() {
    let descriptor = shop::Checkout::descriptor();
    let fields: Vec<_> = descriptor.injection_points().iter().map(|p| p.field()).collect();
    assert_eq!(fields, vec!["inventory", "currency"]);

    let inventory = &descriptor.injection_points()[0];
    assert_eq!(inventory.configuration_key(), None);
    assert_eq!(
        inventory.value_type().as_component(),
        Some(&ComponentType::of::<shop::Inventory>())
    );

    let currency = &descriptor.injection_points()[1];
    assert_eq!(currency.configuration_key(), Some("checkout.currency"));
    assert!(currency.value_type().as_component().is_none());
}

#[test]
fn test_bootstrap_from_inventory() {
    let file = properties(
        "inventory.capacity = 500\n\
         inventory.warehouse: north\n\
         checkout.currency=EUR\n\
         pricing.tax=0.2\n",
    );

    let context = ApplicationContext::bootstrap(["container::shop"], [file.path()]).unwrap();

    // Checkout、Inventory、PriceList；AuditLog 没有注入点
    assert_eq!(context.get_components_size(), 3);
    assert!(context.get_component::<shop::AuditLog>().is_none());

    let checkout = context.get_component::<shop::Checkout>().unwrap();
    let inventory = context.get_component::<shop::Inventory>().unwrap();
    let from_field = checkout.read().inventory.clone().unwrap();
    assert!(Arc::ptr_eq(&from_field, &inventory));

    assert_eq!(checkout.read().currency.as_deref(), Some("EUR"));
    assert_eq!(inventory.read().capacity, Some(500));
    assert_eq!(inventory.read().warehouse.as_deref(), Some("north"));
    assert_eq!(inventory.read().reserved, 0);

    let prices = context.get_component::<shop::pricing::PriceList>().unwrap();
    assert_eq!(prices.read().discount, 0.1);
    assert_eq!(prices.read().tax, Some(0.2));
}

#[test]
fn test_nested_namespace_scans_only_nested_components() {
    let context =
        ApplicationContext::bootstrap(["container::shop::pricing"], Vec::<PathBuf>::new()).unwrap();

    assert_eq!(context.get_components_size(), 1);
    let prices = context.get_component::<shop::pricing::PriceList>().unwrap();
    assert_eq!(prices.read().tax, None);
}

#[test]
fn test_later_property_file_wins() {
    let f1 = properties("checkout.currency=USD\ninventory.capacity=1\n");
    let f2 = properties("checkout.currency=GBP\n");

    let context = ApplicationContext::bootstrap(["container::shop"], [f1.path(), f2.path()]).unwrap();
    let checkout = context.get_component::<shop::Checkout>().unwrap();
    assert_eq!(checkout.read().currency.as_deref(), Some("GBP"));
    assert_eq!(context.configuration().get("inventory.capacity"), Some("1"));

    let context = ApplicationContext::bootstrap(["container::shop"], [f2.path(), f1.path()]).unwrap();
    let checkout = context.get_component::<shop::Checkout>().unwrap();
    assert_eq!(checkout.read().currency.as_deref(), Some("USD"));
}

#[test]
fn test_dependency_created_early_is_injected_later() {
    let mut config = ConfigurationMap::new();
    config.insert("inventory.capacity", "42");

    let registry = ComponentRegistry::new();
    InjectionResolver::resolve(&shop::Checkout::descriptor(), &registry, &config).unwrap();

    let inventory = registry.get_typed::<shop::Inventory>().unwrap();
    assert_eq!(inventory.read().capacity, None);

    InjectionResolver::resolve(&shop::Inventory::descriptor(), &registry, &config).unwrap();

    let checkout = registry.get_typed::<shop::Checkout>().unwrap();
    let seen = checkout.read().inventory.clone().unwrap();
    assert!(Arc::ptr_eq(&seen, &inventory));
    assert_eq!(seen.read().capacity, Some(42));
}

#[test]
fn test_static_scanner_controls_resolution_order() {
    // Inventory 先于 Checkout 解析，两种顺序得到同样的结果
    let scanner = StaticScanner::new()
        .with_component::<shop::Inventory>("app")
        .with_component::<shop::Checkout>("app");
    let file = properties("inventory.warehouse=south\n");

    let context = ApplicationContext::builder()
        .namespace("app")
        .property_file(file.path())
        .scanner(scanner)
        .build()
        .unwrap();

    let checkout = context.get_component::<shop::Checkout>().unwrap();
    let inventory = checkout.read().inventory.clone().unwrap();
    assert_eq!(inventory.read().warehouse.as_deref(), Some("south"));
    assert_eq!(checkout.read().currency, None);
}

#[test]
fn test_cycle_terminates_with_shared_instances() {
    let context = ApplicationContext::bootstrap(["container::cycle"], Vec::<PathBuf>::new()).unwrap();
    assert_eq!(context.get_components_size(), 2);

    let left = context.get_component::<cycle::Left>().unwrap();
    let right = context.get_component::<cycle::Right>().unwrap();

    let left_right = left.read().right.clone().unwrap();
    let right_left = right.read().left.clone().unwrap();
    let right_itself = right.read().itself.clone().unwrap();
    assert!(Arc::ptr_eq(&left_right, &right));
    assert!(Arc::ptr_eq(&right_left, &left));
    assert!(Arc::ptr_eq(&right_itself, &right));

    // 打破引用环，避免测试泄漏
    right.write().left = None;
    right.write().itself = None;
}

#[test]
fn test_unparsable_property_aborts_bootstrap() {
    let file = properties("inventory.capacity=lots\n");
    let err = ApplicationContext::bootstrap(["container::shop"], [file.path()]).unwrap_err();

    match err {
        ContainerError::FieldAccess { component, field, reason } => {
            assert!(component.ends_with("Inventory"));
            assert_eq!(field, "capacity");
            assert!(reason.contains("lots"));
        }
        other => panic!("Expected FieldAccess, got {:?}", other),
    }
}

#[test]
fn test_constructor_failure_aborts_bootstrap() {
    let err = ApplicationContext::bootstrap(["container::broken"], Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, ContainerError::Instantiation { .. }));
    assert!(err.to_string().contains("connection refused"));
    assert!(err.to_string().contains("Unreachable"));
}

#[test]
fn test_invalid_namespace_is_discovery_error() {
    let err = ApplicationContext::bootstrap(["container-shop"], Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, ContainerError::Discovery { .. }));

    let err = ApplicationContext::bootstrap([""], Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, ContainerError::Discovery { .. }));
}

#[test]
fn test_empty_namespace_yields_empty_context() {
    let context =
        ApplicationContext::bootstrap(["container::nothing_here"], Vec::<PathBuf>::new()).unwrap();
    assert_eq!(context.get_components_size(), 0);
}

#[test]
fn test_missing_property_files_only_warn() {
    let context = ApplicationContext::bootstrap(
        ["container::shop::pricing"],
        ["missing.properties", "missing.toml"],
    )
    .unwrap();

    assert_eq!(context.config_warnings().len(), 2);
    assert!(context.configuration().is_empty());
}
