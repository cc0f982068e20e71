use syn::{Attribute, LitStr, Meta, Path, Type};

/// 字段上 `#[inject]` 声明的注入方式
pub(crate) enum InjectKind {
    /// `#[inject]`：从容器解析组件
    Component,
    /// `#[inject(property = "key")]`：从配置解析
    Property(LitStr),
}

/// 解析字段上的 `#[inject]` 属性，没有该属性时返回 None
///
/// 空的配置键等同于 `#[inject]`
pub(crate) fn get_inject_kind(attrs: &[Attribute]) -> syn::Result<Option<InjectKind>> {
    for attr in attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }
        if let Meta::Path(_) = attr.meta {
            return Ok(Some(InjectKind::Component));
        }

        let mut property: Option<LitStr> = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("property") {
                property = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported inject option, expected `property = \"...\"`"))
            }
        })?;

        return Ok(Some(match property {
            Some(key) if !key.value().is_empty() => InjectKind::Property(key),
            _ => InjectKind::Component,
        }));
    }
    Ok(None)
}

/// 从 `#[component(constructor = path)]` 中提取构造函数路径
pub(crate) fn get_constructor(attrs: &[Attribute]) -> syn::Result<Option<Path>> {
    let mut constructor = None;
    for attr in attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                constructor = Some(meta.value()?.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported component option, expected `constructor = path`"))
            }
        })?;
    }
    Ok(constructor)
}

/// 从 `Option<T>` 中提取 `T`
pub(crate) fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first() {
                        return Some(inner_ty);
                    }
                }
            }
        }
    }
    None
}
