//! Code generation for `#[derive(Reflect)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type, WhereClause, parse_quote};

use crate::attributes::{FieldAttributes, TypeAttributes};

// -----------------------------------------------------------------------------
// Entry

/// Collected information of the derived type.
struct ReflectMeta<'a> {
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
    root: syn::Path,
}

/// A field visible to reflection.
struct ReflectField<'a> {
    member: &'a Ident,
    name: String,
    ty: &'a Type,
    attrs: FieldAttributes,
}

pub(crate) fn match_reflect_impls(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let meta = ReflectMeta {
        ident: &ast.ident,
        generics: &ast.generics,
        attrs: TypeAttributes::parse_attrs(&ast.attrs)?,
        root: crate::path::vc_json_reflect(),
    };

    if meta.attrs.opaque.is_some() {
        return Ok(impl_opaque(&meta));
    }

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    ast,
                    "tuple structs are not reflected by field, use `#[reflect(opaque)]`",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only named structs are reflected by field, use `#[reflect(opaque)]`",
            ));
        }
    };

    let mut active = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(member) = field.ident.as_ref() else {
            unreachable!("named fields always have an ident");
        };
        let name = member.to_string();
        let name = name.strip_prefix("r#").map(str::to_owned).unwrap_or(name);
        active.push(ReflectField {
            member,
            name,
            ty: &field.ty,
            attrs,
        });
    }

    Ok(impl_struct(&meta, &active))
}

// -----------------------------------------------------------------------------
// Shared pieces

impl ReflectMeta<'_> {
    fn is_generic(&self) -> bool {
        self.generics.type_params().next().is_some()
            || self.generics.const_params().next().is_some()
    }

    /// Generics with the bounds every generated impl needs.
    fn where_clause(&self, field_types: &[&Type]) -> WhereClause {
        let typed_ = crate::path::typed_(&self.root);
        let ident = self.ident;
        let (_, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut clause = where_clause.cloned().unwrap_or_else(|| WhereClause {
            where_token: Default::default(),
            predicates: Default::default(),
        });

        for param in self.generics.type_params() {
            let param = &param.ident;
            clause
                .predicates
                .push(parse_quote!(#param: ::core::marker::Send + ::core::marker::Sync + 'static));
        }
        clause
            .predicates
            .push(parse_quote!(#ident #ty_generics: ::core::default::Default));
        // Non-generic field types are checked at their use site, bounding them here
        // would make recursive types overflow trait resolution.
        if self.is_generic() {
            for ty in field_types {
                clause.predicates.push(parse_quote!(#ty: #typed_));
            }
        }
        clause
    }

    /// The body of `Typed::type_info`, storing the info built by `info`.
    fn type_info_body(&self, info: TokenStream) -> TokenStream {
        let type_info_ = crate::path::type_info_(&self.root);
        if !self.is_generic() {
            let cell_ = crate::path::non_generic_cell_(&self.root);
            quote! {
                static CELL: #cell_ = #cell_::new();
                CELL.get_or_init(|| #type_info_::#info)
            }
        } else {
            let cell_ = crate::path::generic_cell_(&self.root);
            quote! {
                static CELL: #cell_ = #cell_::new();
                CELL.get_or_insert::<Self>(|| #type_info_::#info)
            }
        }
    }

    /// `.with_zero_check(..)` and `.with_trait(..)` calls for type options.
    fn info_builders(&self) -> TokenStream {
        let root = &self.root;
        let from_type_ = crate::path::from_type_(root);

        let zero_check = self.attrs.partial_eq.map(|_| {
            let zero_check_ = crate::path::zero_check_(root);
            quote! { .with_zero_check(#zero_check_::<Self>) }
        });

        let mut traits: Vec<TokenStream> = Vec::new();
        if self.attrs.serialize.is_some() {
            traits.push(crate::path::serialize_trait_(root));
        }
        if self.attrs.deserialize.is_some() {
            traits.push(crate::path::deserialize_trait_(root));
        }
        for path in &self.attrs.type_traits {
            traits.push(quote! { #path });
        }

        quote! {
            #zero_check
            #( .with_trait(<#traits as #from_type_<Self>>::from_type()) )*
        }
    }

    fn impl_reflect(&self, kind: &Ident, where_clause: &WhereClause) -> TokenStream {
        let root = &self.root;
        let reflect_ = crate::path::reflect_(root);
        let typed_ = crate::path::typed_(root);
        let type_info_ = crate::path::type_info_(root);
        let reflect_ref_ = crate::path::reflect_ref_(root);
        let reflect_mut_ = crate::path::reflect_mut_(root);

        let ident = self.ident;
        let (impl_generics, ty_generics, _) = self.generics.split_for_impl();

        quote! {
            impl #impl_generics #reflect_ for #ident #ty_generics #where_clause {
                #[inline]
                fn reflect_type_info(&self) -> &'static #type_info_ {
                    <Self as #typed_>::type_info()
                }

                #[inline]
                fn reflect_ref(&self) -> #reflect_ref_<'_> {
                    #reflect_ref_::#kind(self)
                }

                #[inline]
                fn reflect_mut(&mut self) -> #reflect_mut_<'_> {
                    #reflect_mut_::#kind(self)
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Opaque

fn impl_opaque(meta: &ReflectMeta) -> TokenStream {
    let root = &meta.root;
    let typed_ = crate::path::typed_(root);
    let type_info_ = crate::path::type_info_(root);
    let opaque_info_ = crate::path::opaque_info_(root);

    let ident = meta.ident;
    let (impl_generics, ty_generics, _) = meta.generics.split_for_impl();
    let where_clause = meta.where_clause(&[]);

    let builders = meta.info_builders();
    let body = meta.type_info_body(quote! {
        Opaque(#opaque_info_::new::<Self>() #builders)
    });
    let reflect_impl = meta.impl_reflect(&format_ident!("Opaque"), &where_clause);

    quote! {
        impl #impl_generics #typed_ for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #type_info_ {
                #body
            }
        }

        #reflect_impl
    }
}

// -----------------------------------------------------------------------------
// Struct

fn impl_struct(meta: &ReflectMeta, fields: &[ReflectField]) -> TokenStream {
    let root = &meta.root;
    let typed_ = crate::path::typed_(root);
    let reflect_ = crate::path::reflect_(root);
    let struct_ = crate::path::struct_(root);
    let type_info_ = crate::path::type_info_(root);
    let struct_info_ = crate::path::struct_info_(root);
    let named_field_ = crate::path::named_field_(root);

    let ident = meta.ident;
    let (impl_generics, ty_generics, _) = meta.generics.split_for_impl();
    let field_types = fields.iter().map(|f| f.ty).collect::<Vec<_>>();
    let where_clause = meta.where_clause(&field_types);

    let named_fields = fields.iter().enumerate().map(|(index, field)| {
        let ty = field.ty;
        let name = &field.name;
        let tags = field.attrs.tags.iter().map(|(k, v)| quote! { (#k, #v) });
        let embedded = field.attrs.embed;
        quote! {
            #named_field_::new::<#ty>(#name, #index)
                .with_tags(&[#(#tags),*])
                .with_embedded(#embedded)
        }
    });

    let builders = meta.info_builders();
    let body = meta.type_info_body(quote! {
        Struct(#struct_info_::new::<Self>(&[#(#named_fields),*]) #builders)
    });

    let indices = 0..fields.len();
    let field_count = fields.len();
    let members = fields.iter().map(|f| f.member).collect::<Vec<_>>();
    let indices_mut = indices.clone();

    let reflect_impl = meta.impl_reflect(&format_ident!("Struct"), &where_clause);

    quote! {
        impl #impl_generics #typed_ for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #type_info_ {
                #body
            }
        }

        #reflect_impl

        impl #impl_generics #struct_ for #ident #ty_generics #where_clause {
            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn #reflect_> {
                match index {
                    #(#indices => ::core::option::Option::Some(#reflect_::as_reflect(&self.#members)),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn #reflect_> {
                match index {
                    #(#indices_mut => ::core::option::Option::Some(#reflect_::as_reflect_mut(&mut self.#members)),)*
                    _ => ::core::option::Option::None,
                }
            }

            #[inline]
            fn field_len(&self) -> usize {
                #field_count
            }
        }
    }
}
