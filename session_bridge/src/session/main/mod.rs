mod authenticator;
mod cookie;
mod crypto;
mod csrf;
mod envelope;
mod fields;
mod lookup_key;

#[cfg(test)]
mod test_utils;

pub use authenticator::SessionAuthenticator;
