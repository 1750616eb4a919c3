//! Opaque caller identifiers.
//!
//! Subjects and session ids are minted by the identity provider and carried verbatim. The only
//! rule enforced here is that an identifier is not blank.

// self
use crate::_prelude::*;

/// Error returned when an identifier is empty or whitespace-only.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{kind} identifier cannot be blank.")]
pub struct BlankIdentifier {
	/// Identifier that was rejected (`Principal` or `Session`).
	pub kind: &'static str,
}

macro_rules! opaque_id {
	($(#[$meta:meta])* $name:ident => $kind:literal) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(Arc<str>);
		impl $name {
			/// Wraps `value`, rejecting blank input.
			pub fn new(value: impl Into<String>) -> Result<Self, BlankIdentifier> {
				let value = value.into();

				if value.trim().is_empty() {
					return Err(BlankIdentifier { kind: $kind });
				}

				Ok(Self(value.into()))
			}

			/// Identifier exactly as the identity provider issued it.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = BlankIdentifier;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0.as_ref().to_owned()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple($kind).field(&self.as_str()).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

opaque_id! {
	/// Subject of the user a request is sent on behalf of, such as an OIDC `sub` claim.
	PrincipalId => "Principal"
}
opaque_id! {
	/// Sign-in session holding the user's tokens.
	SessionId => "Session"
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_identifiers_are_rejected() {
		assert_eq!(PrincipalId::new(""), Err(BlankIdentifier { kind: "Principal" }));
		assert_eq!(SessionId::new(" \t\n"), Err(BlankIdentifier { kind: "Session" }));
	}

	#[test]
	fn provider_issued_values_are_kept_verbatim() {
		let subject = "x".repeat(255);
		let principal =
			PrincipalId::new(subject.as_str()).expect("Long subjects should be accepted.");

		assert_eq!(principal.as_str(), subject);

		let distinguished =
			PrincipalId::new("CN=Alice Smith,O=Example").expect("Inner spaces should be accepted.");

		assert_eq!(distinguished.to_string(), "CN=Alice Smith,O=Example");

		let alice = PrincipalId::new("alice").expect("Principal fixture should be valid.");

		assert_eq!(format!("{alice:?}"), "Principal(\"alice\")");
	}

	#[test]
	fn serde_rejects_blank_values() {
		let session: SessionId =
			serde_json::from_str("\"sid-42\"").expect("Session should deserialize successfully.");

		assert_eq!(session.as_str(), "sid-42");
		assert_eq!(
			serde_json::to_string(&session).expect("Session should serialize."),
			"\"sid-42\""
		);
		assert!(serde_json::from_str::<SessionId>("\"  \"").is_err());
	}
}
