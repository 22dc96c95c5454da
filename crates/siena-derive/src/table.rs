//! Table derive macro implementation

use heck::ToShoutySnakeCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitStr, Result, Type};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (table_name, schema) = struct_attrs(&input)?;
    let table_name = table_name.unwrap_or_else(|| name.to_string().to_shouty_snake_case());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Table can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Table can only be derived for structs",
            ))
        }
    };

    let mut column_names = Vec::with_capacity(fields.len());
    let mut column_consts = Vec::with_capacity(fields.len());
    let mut from_row_fields = Vec::with_capacity(fields.len());
    let mut from_aliased_fields = Vec::with_capacity(fields.len());
    let mut to_row_values = Vec::with_capacity(fields.len());

    for field in fields {
        let field_ident = field.ident.as_ref().unwrap();
        let column_name = column_attr(field)?
            .unwrap_or_else(|| field_ident.to_string().to_shouty_snake_case());
        if !is_valid_sql_ident(&column_name) {
            return Err(syn::Error::new_spanned(
                field,
                format!("'{column_name}' is not a valid SQL identifier"),
            ));
        }
        let const_ident = format_ident!("{}", field_ident.to_string().to_shouty_snake_case());
        let column_ty = option_inner(&field.ty).unwrap_or(&field.ty);

        column_names.push(column_name.clone());
        column_consts.push(quote! {
            pub const #const_ident: ::siena::Column<#column_ty, #name> =
                ::siena::Column::new(#column_name);
        });
        from_row_fields.push(quote! {
            #field_ident: row.get(#column_name)?
        });
        from_aliased_fields.push(quote! {
            #field_ident: row.get(&::std::format!("{}_{}", alias, #column_name))?
        });
        to_row_values.push(quote! {
            ::siena::ToValue::to_value(::std::clone::Clone::clone(&self.#field_ident))
        });
    }

    Ok(quote! {
        impl ::siena::Table for #name {
            const SCHEMA: &'static str = #schema;
            const NAME: &'static str = #table_name;
            const COLUMNS: &'static [&'static str] = &[#(#column_names),*];

            fn from_aliased_row(row: &::siena::Row, alias: &str) -> ::siena::QueryResult<Self> {
                Ok(Self {
                    #(#from_aliased_fields),*
                })
            }
        }

        impl ::siena::FromRow for #name {
            fn from_row(row: &::siena::Row) -> ::siena::QueryResult<Self> {
                Ok(Self {
                    #(#from_row_fields),*
                })
            }
        }

        impl ::siena::ToRow for #name {
            fn column_values(&self) -> ::std::vec::Vec<::siena::SqlValue> {
                ::std::vec![#(#to_row_values),*]
            }
        }

        impl #name {
            #(#column_consts)*
        }
    })
}

fn struct_attrs(input: &DeriveInput) -> Result<(Option<String>, String)> {
    let mut table_name = None;
    let mut schema = String::new();
    for attr in &input.attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    table_name = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("schema") {
                    let lit: LitStr = meta.value()?.parse()?;
                    schema = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("expected `name = \"...\"` or `schema = \"...\"`"))
                }
            })?;
        }
    }
    Ok((table_name, schema))
}

fn column_attr(field: &syn::Field) -> Result<Option<String>> {
    let mut column = None;
    for attr in &field.attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    column = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `column = \"...\"`"))
                }
            })?;
        }
    }
    Ok(column)
}

/// Strip one level of `Option<...>`, if present.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
