//! The built-in function catalog.
//!
//! Grounded on the teacher's `builtins/mod.rs` dispatch pattern (a static
//! table built once, mapping a lower-cased name to a callable), adapted
//! from Python-builtin parity to spec §4.F's "reflection-style metadata"
//! catalog: every built-in is a unique case-insensitive name with fixed
//! arity, reached through [`lookup`] rather than the teacher's per-name
//! enum variant (Cantus's catalog is data-driven since the set of names is
//! much larger and more uniform than Python's small fixed builtin list).

mod collections;
mod concurrency;
mod crypto;
mod datetime;
mod host_io;
mod io_builtins;
mod matrix_builtins;
mod meta;
pub(crate) mod numeric;
mod sequence;
mod sets;
mod statistics;
mod text;
mod trig;

use crate::{error::CantusResult, evaluator::Evaluator, function::CallArgs, value::Value};

pub type BuiltinFn = fn(&mut Evaluator, CallArgs) -> CantusResult<Value>;

macro_rules! catalog {
    ($($name:literal => $func:expr),+ $(,)?) => {
        /// Looks up a built-in by case-insensitive name.
        pub fn lookup(name: &str) -> Option<BuiltinFn> {
            let lower = name.to_ascii_lowercase();
            match lower.as_str() {
                $($name => Some($func),)+
                _ => None,
            }
        }
    };
}

catalog! {
    "sin" => trig::sin,
    "cos" => trig::cos,
    "tan" => trig::tan,
    "cot" => trig::cot,
    "sec" => trig::sec,
    "csc" => trig::csc,
    "factorial" => numeric::factorial,
    "gamma" => numeric::gamma,
    "isprime" => numeric::is_prime,
    "tofraction" => numeric::to_fraction,
    "quadratic" => numeric::quadratic,
    "conjugate" => numeric::conjugate,
    "select" => collections::select,
    "filter" => collections::filter,
    "exclude" => collections::exclude,
    "get" => collections::get,
    "each" => collections::each,
    "sort" => collections::sort,
    "every" => collections::every,
    "filterindex" => collections::filter_index,
    "determinant" => matrix_builtins::determinant,
    "inverse" => matrix_builtins::inverse,
    "transpose" => matrix_builtins::transpose,
    "rref" => matrix_builtins::rref,
    "matrix" => matrix_builtins::matrix,
    "multiply" => matrix_builtins::multiply,
    "scalarmultiply" => matrix_builtins::scalar_multiply,
    "dot" => matrix_builtins::dot,
    "inner" => matrix_builtins::inner,
    "cross" => matrix_builtins::cross,
    "norm" => matrix_builtins::norm,
    "magnitude" => matrix_builtins::magnitude,
    "swaprows" => matrix_builtins::swap_rows,
    "swapcols" => matrix_builtins::swap_cols,
    "expo" => matrix_builtins::expo,
    "isidentitymatrix" => matrix_builtins::is_identity_matrix,
    "nullspace" => matrix_builtins::null_space,
    "_allclear" => meta::all_clear,
    "_prevans" => meta::prev_ans,
    "_typename" => meta::type_name,

    "sigma" => statistics::sigma,
    "product" => statistics::product,
    "mean" => statistics::mean,
    "median" => statistics::median,
    "mode" => statistics::mode,
    "variance" => statistics::variance,
    "stdev" => statistics::stdev,
    "percentile" => statistics::percentile,

    "split" => text::split,
    "join" => text::join,
    "replace" => text::replace,
    "toupper" => text::to_upper,
    "tolower" => text::to_lower,
    "trim" => text::trim,
    "padleft" => text::pad_left,
    "padright" => text::pad_right,
    "regexmatch" => text::regex_match,
    "regexreplace" => text::regex_replace,
    "parsenumber" => text::parse_number,

    "now" => datetime::now,
    "adddays" => datetime::add_days,
    "addminutes" => datetime::add_minutes,
    "addmonths" => datetime::add_months,
    "dayofweek" => datetime::day_of_week,
    "datediff" => datetime::date_diff,
    "formatdate" => datetime::format_date,

    "print" => io_builtins::print,
    "readline" => io_builtins::read_line,
    "readchar" => io_builtins::read_char,
    "confirm" => io_builtins::confirm,
    "clearconsole" => io_builtins::clear_console,

    "readfile" => host_io::read_file,
    "writefile" => host_io::write_file,
    "appendfile" => host_io::append_file,
    "fileexists" => host_io::file_exists,
    "deletefile" => host_io::delete_file,
    "startprocess" => host_io::start_process,
    "startprocesswait" => host_io::start_process_wait,
    "webget" => host_io::web_get,
    "webpost" => host_io::web_post,
    "clipboardget" => host_io::clipboard_get,
    "clipboardset" => host_io::clipboard_set,

    "md5" => crypto::md5,
    "sha1" => crypto::sha1,
    "sha256" => crypto::sha256,
    "base64encode" => crypto::base64_encode_builtin,
    "base64decode" => crypto::base64_decode_builtin,
    "compress" => crypto::compress,
    "decompress" => crypto::decompress,
    "encodexecryption" => crypto::encode_xecryption,
    "decodexecryption" => crypto::decode_xecryption,

    "async" => concurrency::async_spawn,
    "wait" => concurrency::wait,
    "jointhread" => concurrency::join_thread,
    "killthread" => concurrency::kill_thread,
    "stopall" => concurrency::stop_all,
    "istaskfinished" => concurrency::is_task_finished,

    "set" => sets::set,
    "hashset" => sets::hash_set,
    "union" => sets::union,
    "intersectset" => sets::intersect,
    "differenceset" => sets::difference,
    "symmetricdiff" => sets::symmetric_diff,

    "length" => sequence::length,
    "contains" => sequence::contains,
    "indexof" => sequence::index_of,
    "reverse" => sequence::reverse,
    "push" => sequence::push,
    "pop" => sequence::pop,
    "insert" => sequence::insert,
    "removeat" => sequence::remove_at,
    "concat" => sequence::concat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("Sin").is_some());
        assert!(lookup("SIN").is_some());
        assert!(lookup("not_a_builtin").is_none());
    }
}
