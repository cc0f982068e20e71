use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Field, Fields};

use crate::attribute_helpers::{extract_option_inner_type, get_constructor, get_inject_kind, InjectKind};

pub(crate) fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics.span(),
            "#[derive(Component)] does not support generic types";
            help = "wrap the concrete instantiation in a non-generic struct"
        );
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => abort!(
                input.ident.span(),
                "#[derive(Component)] requires a struct with named fields"
            ),
        },
        _ => abort!(input.ident.span(), "#[derive(Component)] can only be used on structs"),
    };

    let constructor = get_constructor(&input.attrs).unwrap_or_else(|e| abort!(e.span(), "{}", e));
    let instantiate = match constructor {
        Some(path) => quote! {
            #path().map_err(|e| ::sprig_core::ContainerError::instantiation(
                ::std::any::type_name::<Self>(),
                e,
            ))
        },
        None => quote! {
            ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
        },
    };

    let injection_points = fields.iter().filter_map(|field| injection_point(field));

    let expanded = quote! {
        impl ::sprig_core::Component for #name {
            fn instantiate() -> ::sprig_core::ContainerResult<Self> {
                #instantiate
            }

            fn injection_points() -> ::std::vec::Vec<::sprig_core::InjectionPoint> {
                ::std::vec![#(#injection_points),*]
            }
        }

        ::sprig_core::inventory::submit! {
            ::sprig_core::ComponentRegistration {
                namespace: ::std::module_path!(),
                type_name: ::std::concat!(::std::module_path!(), "::", ::std::stringify!(#name)),
                descriptor: <#name as ::sprig_core::Component>::descriptor,
            }
        }
    };

    TokenStream::from(expanded)
}

/// 为一个标注了 `#[inject]` 的字段生成 `InjectionPoint`
fn injection_point(field: &Field) -> Option<proc_macro2::TokenStream> {
    let kind = get_inject_kind(&field.attrs).unwrap_or_else(|e| abort!(e.span(), "{}", e))?;
    let field_name = field.ident.as_ref()?;

    let inner = match extract_option_inner_type(&field.ty) {
        Some(inner) => inner,
        None => abort!(
            field.ty.span(),
            "injected field '{}' must be declared as Option<...>", field_name;
            help = "use Option<Shared<T>> for components and Option<T> for properties"
        ),
    };

    let point = match kind {
        InjectKind::Component => quote! {
            ::sprig_core::InjectionPoint::component::<Self, <#inner as ::sprig_core::ComponentRef>::Target>(
                ::std::stringify!(#field_name),
                |target: &mut Self, value| target.#field_name = ::std::option::Option::Some(value),
            )
        },
        InjectKind::Property(key) => quote! {
            ::sprig_core::InjectionPoint::property::<Self, #inner>(
                ::std::stringify!(#field_name),
                #key,
                |target: &mut Self, value| target.#field_name = value,
            )
        },
    };
    Some(point)
}
