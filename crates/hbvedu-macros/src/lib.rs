use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive a column-oriented `*Timeseries` companion for a per-step flux struct.
///
/// Every field of the annotated struct must be `f64`. The generated struct
/// holds one `Vec<f64>` per field and provides:
///
/// - `with_capacity(n)`, `push(&fluxes)`, `len()`, `is_empty()`
/// - `column(name)`: borrow a column by field name
/// - `into_columns()`: consume into `(name, values)` pairs in declaration order
///
/// The flux struct itself gains `field_names()` and `values()`.
///
/// `#[fluxes(timeseries_name = "CustomName")]` overrides the default
/// `{StructName}Timeseries` name.
#[proc_macro_derive(Fluxes, attributes(fluxes))]
pub fn derive_fluxes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let ts_name = timeseries_name(input)?.unwrap_or_else(|| format_ident!("{}Timeseries", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Fluxes can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Fluxes can only be derived for structs",
            ))
        }
    };

    if fields.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes struct must have at least one field",
        ));
    }

    let mut idents = Vec::with_capacity(fields.len());
    for field in fields {
        if !is_f64(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fluxes derive: all fields must be f64",
            ));
        }
        // Named fields always carry an ident.
        if let Some(ident) = field.ident.as_ref() {
            idents.push(ident);
        }
    }

    let n_fields = idents.len();
    let first = idents[0];
    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();

    Ok(quote! {
        /// Column-oriented timeseries of per-step fluxes.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #ts_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #ts_name {
            /// Pre-allocate every column for `n` timesteps.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            /// Append one timestep.
            pub fn push(&mut self, f: &#name) {
                #(self.#idents.push(f.#idents);)*
            }

            /// Number of timesteps stored.
            pub fn len(&self) -> usize {
                self.#first.len()
            }

            /// Returns `true` if no timesteps have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Borrow a column by field name.
            pub fn column(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#names => Some(self.#idents.as_slice()),)*
                    _ => None,
                }
            }

            /// Consume into `(field_name, values)` pairs in declaration order.
            pub fn into_columns(self) -> Vec<(&'static str, Vec<f64>)> {
                vec![#((#names, self.#idents),)*]
            }
        }

        impl #name {
            /// Field names in declaration order.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }

            /// Field values in declaration order.
            pub fn values(&self) -> [f64; #n_fields] {
                [#(self.#idents),*]
            }
        }
    })
}

fn timeseries_name(input: &DeriveInput) -> syn::Result<Option<proc_macro2::Ident>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("fluxes") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("timeseries_name") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        return Ok(Some(format_ident!("{}", s.value())));
                    }
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "timeseries_name must be a string literal",
                    ));
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unsupported fluxes attribute, expected timeseries_name = \"...\"",
                    ))
                }
            }
        }
    }
    Ok(None)
}

fn is_f64(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.qself.is_none() && p.path.is_ident("f64"))
}
