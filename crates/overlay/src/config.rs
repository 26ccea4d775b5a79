use serde::{Deserialize, Serialize};

/// Which bracket classes the host editor auto-closes.
///
/// Hosts typically read these from their own preference store; the engine
/// only consumes them. Every class defaults to enabled, matching the common
/// editor default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCloseConfig {
	/// Round and square brackets: `(` and `[`.
	pub brackets: bool,
	/// Angle brackets: `<`.
	pub angle_brackets: bool,
	/// Curly braces: `{`.
	pub braces: bool,
	/// String and character quotes: `"` and `'`.
	pub quotes: bool,
}

impl Default for AutoCloseConfig {
	fn default() -> Self {
		Self {
			brackets: true,
			angle_brackets: true,
			braces: true,
			quotes: true,
		}
	}
}

impl AutoCloseConfig {
	/// Config with every class disabled.
	pub fn disabled() -> Self {
		Self {
			brackets: false,
			angle_brackets: false,
			braces: false,
			quotes: false,
		}
	}

	/// Whether the class owning `symbol` (an opening character) is auto-closed.
	pub fn closes(&self, symbol: char) -> bool {
		match symbol {
			'(' | '[' => self.brackets,
			'<' => self.angle_brackets,
			'{' => self.braces,
			'"' | '\'' => self.quotes,
			_ => false,
		}
	}
}
