/*!
Command dispatcher module: declarations and re-exports only.

  src/cmd/
    mod.rs          (this file)
    demo.rs         (the command tree turned into tools)
    list.rs         (ListArgs  + execute_list)
    get.rs          (GetArgs   + execute_get)
    call.rs         (CallArgs  + execute_call)
    serve.rs        (ServeArgs + execute_serve)
    shared.rs       (tool lookup, parameter coercion, result helpers)
    format.rs       (human output styling)
*/

pub mod call;
pub mod demo;
pub mod format;
pub mod get;
pub mod list;
pub mod serve;
pub mod shared;

pub use call::{CallArgs, execute_call};
pub use get::{GetArgs, execute_get};
pub use list::{ListArgs, execute_list};
pub use serve::{ServeArgs, execute_serve};
