//! 进程级上下文只能初始化一次，所以这个文件只有一个测试

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use sprig_core::prelude::*;
use sprig_core::ContextState;
use sprig_core_macros::Component;

mod app {
    use super::*;

    #[derive(Component, Default)]
    pub struct Greeter {
        #[inject(property = "greeting")]
        pub greeting: Option<String>,
    }

    #[derive(Component, Default)]
    pub struct Frontdesk {
        #[inject]
        pub greeter: Option<Shared<Greeter>>,
    }
}

#[test]
fn test_get_instance_is_process_wide() {
    assert_eq!(ApplicationContext::global_state(), ContextState::Uninitialized);

    // 启动失败不会发布任何实例
    let err = ApplicationContext::get_instance(["not a namespace"], Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, ContainerError::Discovery { .. }));
    assert_eq!(ApplicationContext::global_state(), ContextState::Uninitialized);

    let mut file = tempfile::Builder::new().suffix(".properties").tempfile().unwrap();
    writeln!(file, "greeting=hello").unwrap();

    let first = ApplicationContext::get_instance(["global_context::app"], [file.path()]).unwrap();
    assert_eq!(ApplicationContext::global_state(), ContextState::Ready);
    assert_eq!(first.get_components_size(), 2);

    let greeter = first.get_component::<app::Greeter>().unwrap();
    assert_eq!(greeter.read().greeting.as_deref(), Some("hello"));

    // 第二次调用忽略参数，返回同一个上下文
    let second = ApplicationContext::get_instance(["other::namespace"], ["other.properties"]).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.namespaces(), ["global_context::app".to_string()]);

    let again = second.get_component::<app::Greeter>().unwrap();
    assert!(Arc::ptr_eq(&greeter, &again));

    // 启动器复用已有的进程级上下文
    let third = SprigApplication::new("global")
        .banner(false)
        .init_logging(false)
        .namespace("ignored")
        .run()
        .unwrap();
    assert!(std::ptr::eq(first, third));
}
