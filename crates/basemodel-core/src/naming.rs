//! Type-name to storage-name convention.

/// Convert an upper-camel-case type name into its snake-case table name.
///
/// Every uppercase character becomes `_` followed by its lowercase form, and
/// leading underscores are stripped from the result. Runs of capitals are not
/// special-cased, so `HTTPServer` becomes `h_t_t_p_server`.
///
/// ```
/// use basemodel_core::naming::title_to_snake;
///
/// assert_eq!(title_to_snake("UserAccount"), "user_account");
/// assert_eq!(title_to_snake("HTTPServer"), "h_t_t_p_server");
/// ```
pub fn title_to_snake(title_case: &str) -> String {
    let mut out = String::with_capacity(title_case.len() + 4);
    for c in title_case.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}
