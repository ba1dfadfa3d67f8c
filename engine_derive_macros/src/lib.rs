use proc_macro::TokenStream;
use proc_macro2::Span;
use syn::{parse_macro_input, DeriveInput, Ident, LitStr};

/// Implements `Component`, deriving the ID from the crate namespace and the type name
#[proc_macro_derive(Component)]
pub fn component_derive(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input: DeriveInput = parse_macro_input!(input);

    // Get the name of the struct being derived
    let name = &input.ident;
    let name_str = name.to_string();

    // Generate the implementation of the `Component` trait
    let gen = quote::quote! {
         impl colorcube_engine_interface::ecs::Component for #name {
             // Use the namespace of the current crate and the name of the struct
             const ID: colorcube_engine_interface::ecs::ComponentId =
                 colorcube_engine_interface::ecs::ComponentId::new(
                     concat!(env!("CARGO_PKG_NAME"), "/", #name_str)
                 );
         }
    };

    gen.into()
}

/// Implements `Message`. The locality is given with `#[locality("Local")]` or
/// `#[locality("Remote")]`, and defaults to local.
#[proc_macro_derive(Message, attributes(locality))]
pub fn message_derive(input: TokenStream) -> TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    let name = &input.ident;
    let name_str = name.to_string();

    let mut locality = Ident::new("Local", Span::call_site());
    for attr in &input.attrs {
        if !attr.path.is_ident("locality") {
            continue;
        }

        let lit: LitStr = match attr.parse_args() {
            Ok(lit) => lit,
            Err(e) => return e.to_compile_error().into(),
        };

        match lit.value().as_str() {
            "Local" | "Remote" => locality = Ident::new(&lit.value(), lit.span()),
            other => {
                return syn::Error::new(
                    lit.span(),
                    format!("Unknown locality {other:?}, expected \"Local\" or \"Remote\""),
                )
                .to_compile_error()
                .into()
            }
        }
    }

    let gen = quote::quote! {
         impl colorcube_engine_interface::channels::Message for #name {
             const CHANNEL: colorcube_engine_interface::channels::ChannelId =
                 colorcube_engine_interface::channels::ChannelId::new(
                     concat!(env!("CARGO_PKG_NAME"), "/", #name_str),
                     colorcube_engine_interface::Locality::#locality,
                 );
         }
    };

    gen.into()
}
