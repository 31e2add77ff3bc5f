//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
    fn has_section(&self, section: &str) -> bool;
}
