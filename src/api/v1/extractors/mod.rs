mod principal;

pub use principal::PrincipalExtractor;
