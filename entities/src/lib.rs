pub mod source_setting;

pub mod prelude {
    pub use super::source_setting::Entity as SourceSetting;
}
