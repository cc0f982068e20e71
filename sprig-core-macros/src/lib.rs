mod attribute_helpers;
mod component_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Component 派生宏
///
/// 为结构体实现 `sprig_core::Component`，并把它注册到所在模块的命名空间中。
///
/// 用法：
/// ```ignore
/// #[derive(Component, Default)]
/// #[component(constructor = OrderService::create)]  // 可选：fn() -> anyhow::Result<Self>
/// pub struct OrderService {
///     #[inject]                                  // 组件字段：Option<Shared<T>>
///     repository: Option<Shared<OrderRepository>>,
///
///     #[inject(property = "orders.page-size")]   // 配置字段：Option<T>，T: FromStr
///     page_size: Option<usize>,
///
///     cache: HashMap<u64, Order>,                // 未标注的字段不参与注入
/// }
/// ```
///
/// 未指定 `constructor` 时使用 `Default::default()` 构造实例。
#[proc_macro_error]
#[proc_macro_derive(Component, attributes(component, inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component_impl::derive_component_impl(input)
}
