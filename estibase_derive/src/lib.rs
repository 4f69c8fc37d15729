use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Expr, Fields, Ident, LitStr, Path, Type, parse_macro_input, spanned::Spanned};

/// Derives `BaseObject`, `FromParams` and `PartialEq` for a struct with
/// named fields.
///
/// Struct attribute:
/// `#[base_object(class = STATIC, init = path, test_params = path, estimator)]`
///
/// Field attributes:
/// - `#[param]` / `#[param(default = expr)]` / `#[param(default)]`
/// - `#[fitted]` on an `Option<T>` field; a trailing `_` is dropped from the name
/// - `#[overrides]` on exactly one `estibase::Overrides` field
///
/// Other fields are filled with `Default::default()` on construction.
#[proc_macro_derive(BaseObject, attributes(base_object, param, fitted, overrides))]
pub fn derive_base_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_base_object(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ObjectOptions {
    class: Path,
    init: Option<Path>,
    test_params: Option<Path>,
    estimator: bool,
}

enum FieldRole {
    Param { default: Option<Expr> },
    Fitted,
    Overrides,
    Plain,
}

struct ObjectField {
    ident: Ident,
    /// Local binding used by generated code, never clashes with `params`.
    local: Ident,
    ty: Type,
    name: String,
    role: FieldRole,
}

fn expand_base_object(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "BaseObject does not support generic structs",
        ));
    }

    let options = parse_object_options(&input.attrs, &struct_name)?;

    let Data::Struct(data_struct) = input.data else {
        return Err(syn::Error::new(
            struct_name.span(),
            "BaseObject can only be derived for structs",
        ));
    };
    let Fields::Named(named_fields) = data_struct.fields else {
        return Err(syn::Error::new(
            struct_name.span(),
            "BaseObject requires named fields",
        ));
    };

    let mut fields = Vec::<ObjectField>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "BaseObject requires named fields"))?;
        let role = parse_field_role(&field.attrs)?;
        let raw_name = ident.unraw().to_string();
        let name = match role {
            FieldRole::Fitted => {
                let trimmed = raw_name.trim_end_matches('_').to_string();
                if trimmed.is_empty() {
                    return Err(syn::Error::new(ident.span(), "invalid fitted attribute name"));
                }
                trimmed
            }
            _ => raw_name,
        };
        fields.push(ObjectField {
            local: format_ident!("__{}", ident),
            ident,
            ty: field.ty,
            name,
            role,
        });
    }

    let overrides_fields: Vec<&ObjectField> = fields
        .iter()
        .filter(|field| matches!(field.role, FieldRole::Overrides))
        .collect();
    let overrides_ident = match overrides_fields.as_slice() {
        [field] => field.ident.clone(),
        [] => {
            return Err(syn::Error::new(
                struct_name.span(),
                "BaseObject requires one field marked #[overrides]",
            ));
        }
        [_, second, ..] => {
            return Err(syn::Error::new(
                second.ident.span(),
                "only one field can be marked #[overrides]",
            ));
        }
    };

    let params: Vec<&ObjectField> = fields
        .iter()
        .filter(|field| matches!(field.role, FieldRole::Param { .. }))
        .collect();
    let fitted: Vec<&ObjectField> = fields
        .iter()
        .filter(|field| matches!(field.role, FieldRole::Fitted))
        .collect();

    let class = &options.class;
    let param_names: Vec<&str> = params.iter().map(|field| field.name.as_str()).collect();
    let fitted_names: Vec<&str> = fitted.iter().map(|field| field.name.as_str()).collect();

    // BaseObject::params
    let param_inserts = params.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        quote! {
            params.insert(#name.to_string(), ::estibase::ParamType::to_value(&self.#ident));
        }
    });

    // BaseObject::apply_params: convert everything, then assign
    let apply_converts = params.iter().map(|field| {
        let local = &field.local;
        let ty = &field.ty;
        let name = &field.name;
        quote! {
            let #local = match params.remove(#name) {
                Some(value) => Some(<#ty as ::estibase::ParamType>::from_value(value)?),
                None => None,
            };
        }
    });
    let apply_assigns = params.iter().map(|field| {
        let ident = &field.ident;
        let local = &field.local;
        quote! {
            if let Some(value) = #local {
                self.#ident = value;
            }
        }
    });

    let fitted_inserts = fitted.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        quote! {
            if let Some(value) = &self.#ident {
                state.insert(#name.to_string(), ::estibase::ParamType::to_value(value));
            }
        }
    });
    let fitted_converts = fitted.iter().map(|field| {
        let local = &field.local;
        let ty = &field.ty;
        let name = &field.name;
        quote! {
            let #local = match state.remove(#name) {
                Some(value) => <#ty as ::estibase::ParamType>::from_value(value)?,
                None => None,
            };
        }
    });
    let fitted_assigns = fitted.iter().map(|field| {
        let ident = &field.ident;
        let local = &field.local;
        quote! { self.#ident = #local; }
    });

    // FromParams::from_params
    let construct_converts = params.iter().map(|field| {
        let local = &field.local;
        let ty = &field.ty;
        let name = &field.name;
        let missing = match &field.role {
            FieldRole::Param { default: Some(expr) } => quote! { { let value: #ty = #expr; value } },
            _ => quote! {
                { return Err(::estibase::__private::missing_parameter(#name, &#class)); }
            },
        };
        quote! {
            let #local: #ty = match params.remove(#name) {
                Some(value) => <#ty as ::estibase::ParamType>::from_value(value)?,
                None => #missing,
            };
        }
    });
    let field_inits = fields.iter().map(|field| {
        let ident = &field.ident;
        match field.role {
            FieldRole::Param { .. } => {
                let local = &field.local;
                quote! { #ident: #local }
            }
            _ => quote! { #ident: ::core::default::Default::default() },
        }
    });
    let init_call = options.init.as_ref().map(|init| {
        quote! { #init(&mut object)?; }
    });

    let default_inserts = params.iter().filter_map(|field| {
        let FieldRole::Param { default: Some(expr) } = &field.role else {
            return None;
        };
        let ty = &field.ty;
        let name = &field.name;
        Some(quote! {
            {
                let value: #ty = #expr;
                defaults.insert(#name.to_string(), ::estibase::ParamType::to_value(&value));
            }
        })
    });

    let test_params_fn = options.test_params.as_ref().map(|path| {
        quote! {
            fn test_params() -> ::std::vec::Vec<::estibase::ValueMap> {
                #path()
            }
        }
    });

    let estimator_impl = options.estimator.then(|| {
        quote! {
            impl ::estibase::BaseEstimator for #struct_name {}
        }
    });

    Ok(quote! {
        impl ::estibase::BaseObject for #struct_name {
            fn class(&self) -> &'static ::estibase::ObjectClass {
                &#class
            }

            fn params(&self) -> ::estibase::ValueMap {
                let mut params = ::estibase::ValueMap::new();
                #(#param_inserts)*
                params
            }

            fn apply_params(&mut self, mut params: ::estibase::ValueMap) -> ::estibase::Result<()> {
                ::estibase::__private::reject_unknown(&params, &[#(#param_names),*], &#class)?;
                #(#apply_converts)*
                #(#apply_assigns)*
                Ok(())
            }

            fn overrides(&self) -> &::estibase::Overrides {
                &self.#overrides_ident
            }

            fn overrides_mut(&mut self) -> &mut ::estibase::Overrides {
                &mut self.#overrides_ident
            }

            fn get_param_defaults(&self) -> ::estibase::ValueMap {
                <Self as ::estibase::FromParams>::param_defaults()
            }

            fn fitted_state(&self) -> ::estibase::ValueMap {
                let mut state = ::estibase::ValueMap::new();
                #(#fitted_inserts)*
                state
            }

            fn restore_fitted_state(&mut self, mut state: ::estibase::ValueMap) -> ::estibase::Result<()> {
                ::estibase::__private::reject_unknown(&state, &[#(#fitted_names),*], &#class)?;
                #(#fitted_converts)*
                #(#fitted_assigns)*
                Ok(())
            }

            fn reset(&mut self) -> ::estibase::Result<()> {
                let config = self.#overrides_ident.config.clone();
                let params = ::estibase::BaseObject::params(self);
                *self = <Self as ::estibase::FromParams>::from_params(params)?;
                self.#overrides_ident.config.extend(config);
                Ok(())
            }

            fn rebuild(
                &self,
                params: ::estibase::ValueMap,
            ) -> ::estibase::Result<::std::boxed::Box<dyn ::estibase::BaseObject>> {
                Ok(::std::boxed::Box::new(
                    <Self as ::estibase::FromParams>::from_params(params)?,
                ))
            }

            fn as_base(&self) -> &dyn ::estibase::BaseObject {
                self
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl ::estibase::FromParams for #struct_name {
            fn from_params(mut params: ::estibase::ValueMap) -> ::estibase::Result<Self> {
                ::estibase::__private::reject_unknown(&params, &[#(#param_names),*], &#class)?;
                #(#construct_converts)*
                #[allow(unused_mut)]
                let mut object = Self {
                    #(#field_inits),*
                };
                #init_call
                Ok(object)
            }

            fn param_names() -> ::std::vec::Vec<&'static str> {
                vec![#(#param_names),*]
            }

            fn param_defaults() -> ::estibase::ValueMap {
                #[allow(unused_mut)]
                let mut defaults = ::estibase::ValueMap::new();
                #(#default_inserts)*
                defaults
            }

            #test_params_fn
        }

        impl ::core::cmp::PartialEq for #struct_name {
            fn eq(&self, other: &Self) -> bool {
                ::estibase::BaseObject::params(self) == ::estibase::BaseObject::params(other)
            }
        }

        #estimator_impl
    })
}

fn parse_object_options(attrs: &[syn::Attribute], struct_name: &Ident) -> syn::Result<ObjectOptions> {
    let mut class = None;
    let mut init = None;
    let mut test_params = None;
    let mut estimator = false;

    for attr in attrs {
        if !attr.path().is_ident("base_object") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                class = Some(parse_path_value(&meta)?);
                return Ok(());
            }

            if meta.path.is_ident("init") {
                init = Some(parse_path_value(&meta)?);
                return Ok(());
            }

            if meta.path.is_ident("test_params") {
                test_params = Some(parse_path_value(&meta)?);
                return Ok(());
            }

            if meta.path.is_ident("estimator") {
                estimator = true;
                return Ok(());
            }

            Err(meta.error(
                "Unsupported base_object attribute. Supported: class = PATH, init = PATH, test_params = PATH, estimator",
            ))
        })?;
    }

    let class = class.ok_or_else(|| {
        syn::Error::new(
            struct_name.span(),
            "BaseObject requires #[base_object(class = STATIC)]",
        )
    })?;

    Ok(ObjectOptions {
        class,
        init,
        test_params,
        estimator,
    })
}

/// Accepts both `key = path` and `key = "path"`.
fn parse_path_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Path> {
    let value = meta.value()?;
    if value.peek(LitStr) {
        let lit: LitStr = value.parse()?;
        return lit.parse();
    }
    value.parse()
}

fn parse_field_role(attrs: &[syn::Attribute]) -> syn::Result<FieldRole> {
    let mut role = FieldRole::Plain;

    for attr in attrs {
        let next = if attr.path().is_ident("param") {
            let mut default = None;
            if let syn::Meta::List(list) = &attr.meta {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("default") {
                        default = Some(if meta.input.peek(syn::Token![=]) {
                            meta.value()?.parse::<Expr>()?
                        } else {
                            syn::parse_quote!(::core::default::Default::default())
                        });
                        return Ok(());
                    }

                    Err(meta.error(
                        "Unsupported #[param(...)] option. Supported: default, default = <expr>",
                    ))
                })?;
            }
            FieldRole::Param { default }
        } else if attr.path().is_ident("fitted") {
            FieldRole::Fitted
        } else if attr.path().is_ident("overrides") {
            FieldRole::Overrides
        } else {
            continue;
        };

        if !matches!(role, FieldRole::Plain) {
            return Err(syn::Error::new(
                attr.span(),
                "a field can carry only one of #[param], #[fitted], #[overrides]",
            ));
        }
        role = next;
    }

    Ok(role)
}
