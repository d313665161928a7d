/// The durable unit: one permission held by one API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grant<'a> {
    pub api_key: &'a str,
    pub module: &'a str,
    pub action: &'a str,
}

impl<'a> Grant<'a> {
    #[must_use]
    pub fn new(api_key: &'a str, module: &'a str, action: &'a str) -> Self {
        Self {
            api_key,
            module,
            action,
        }
    }
}
