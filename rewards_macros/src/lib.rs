use proc_macro::TokenStream;
use quote::ToTokens;
use syn;

/// This macro is added before a method of the `Table` struct in its impl
/// block. Use it to first check that the table is currently in the exact
/// stage named in the attribute.
///
/// For example, `#[allowed_stage(ChooseBet)]` makes a method return a
/// `TableError::WrongStage` unless the current stage is `ChooseBet`.
#[proc_macro_attribute]
pub fn allowed_stage(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut ast: syn::ImplItemFn = syn::parse(item).unwrap();
    let stage = attr.to_string();
    let method_name = ast.sig.ident.to_string();
    let code = format!(
        r#"
    if self.stage != GameStage::{} {{
        return Err(TableError::WrongStage {{
            method: "{}",
            required: GameStage::{},
        }});
    }}
"#,
        stage, method_name, stage
    );
    let early_return: TokenStream = code.parse().unwrap();
    let early_return: syn::Stmt = syn::parse(early_return).unwrap();
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}
