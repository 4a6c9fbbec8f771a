//! The subset of CSS selectors the page bindings use:
//! comma-separated compounds of a type or `*`, `.class`, `#id`, `[attr]`, `[attr=v]`, `[attr^=v]`, `[attr~=v]` and `:not(…)`.
//!
//! Combinators aren't supported.

use core::{
	fmt::{self, Display, Formatter},
	iter::Peekable,
	str::CharIndices,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
	pub position: usize,
	pub expected: &'static str,
}
impl Display for SelectorError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Invalid selector: expected {} at {}", self.expected, self.position)
	}
}
impl std::error::Error for SelectorError {}

/// What a selector needs to know about an element.
pub(super) trait Subject {
	fn local_name(&self) -> &str;
	fn is_html(&self) -> bool;
	fn attribute(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Compound>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
	Class(String),
	Id(String),
	Attribute { name: String, test: Option<(Operator, String)> },
	Not(Compound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
	Equals,
	Prefix,
	Includes,
}

impl SelectorList {
	pub fn parse(text: &str) -> Result<Self, SelectorError> {
		let mut parser = Parser {
			chars: text.char_indices().peekable(),
			len: text.len(),
		};
		let mut compounds = Vec::new();
		loop {
			parser.skip_whitespace();
			compounds.push(parser.compound()?);
			parser.skip_whitespace();
			match parser.next() {
				Some((_, ',')) => continue,
				None => break,
				Some((position, _)) => return Err(SelectorError { position, expected: "`,` or end" }),
			}
		}
		Ok(Self(compounds))
	}

	pub(super) fn matches(&self, subject: &impl Subject) -> bool {
		self.0.iter().any(|compound| compound.matches(subject))
	}
}

impl Compound {
	fn matches(&self, subject: &impl Subject) -> bool {
		if let Some(tag) = &self.tag {
			let name_matches = if subject.is_html() {
				subject.local_name().eq_ignore_ascii_case(tag)
			} else {
				subject.local_name() == tag
			};
			if !name_matches {
				return false;
			}
		}
		self.conditions.iter().all(|condition| condition.matches(subject))
	}
}

impl Condition {
	fn matches(&self, subject: &impl Subject) -> bool {
		match self {
			Condition::Class(class) => subject.attribute("class").map_or(false, |classes| classes.split_ascii_whitespace().any(|c| c == class)),
			Condition::Id(id) => subject.attribute("id") == Some(id.as_str()),
			Condition::Attribute { name, test } => match (subject.attribute(name), test) {
				(None, _) => false,
				(Some(_), None) => true,
				(Some(actual), Some((Operator::Equals, expected))) => actual == expected,
				(Some(actual), Some((Operator::Prefix, expected))) => !expected.is_empty() && actual.starts_with(expected.as_str()),
				(Some(actual), Some((Operator::Includes, expected))) => actual.split_ascii_whitespace().any(|word| word == expected),
			},
			Condition::Not(compound) => !compound.matches(subject),
		}
	}
}

struct Parser<'a> {
	chars: Peekable<CharIndices<'a>>,
	len: usize,
}
impl Parser<'_> {
	fn next(&mut self) -> Option<(usize, char)> {
		self.chars.next()
	}

	fn peek(&mut self) -> Option<char> {
		self.chars.peek().map(|&(_, c)| c)
	}

	fn position(&mut self) -> usize {
		let len = self.len;
		self.chars.peek().map_or(len, |&(i, _)| i)
	}

	fn error<T>(&mut self, expected: &'static str) -> Result<T, SelectorError> {
		Err(SelectorError {
			position: self.position(),
			expected,
		})
	}

	fn eat(&mut self, c: char) -> bool {
		if self.peek() == Some(c) {
			self.next();
			true
		} else {
			false
		}
	}

	fn skip_whitespace(&mut self) {
		while self.peek().map_or(false, char::is_whitespace) {
			self.next();
		}
	}

	fn ident(&mut self) -> Result<String, SelectorError> {
		let mut ident = String::new();
		while let Some(c) = self.peek() {
			if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
				ident.push(c);
				self.next();
			} else {
				break;
			}
		}
		if ident.is_empty() {
			self.error("identifier")
		} else {
			Ok(ident)
		}
	}

	fn compound(&mut self) -> Result<Compound, SelectorError> {
		let (tag, mut any) = match self.peek() {
			Some('*') => {
				self.next();
				(None, true)
			}
			Some(c) if c.is_alphabetic() => (Some(self.ident()?), true),
			_ => (None, false),
		};
		let mut compound = Compound { tag, conditions: Vec::new() };
		loop {
			let condition = match self.peek() {
				Some('.') => {
					self.next();
					Condition::Class(self.ident()?)
				}
				Some('#') => {
					self.next();
					Condition::Id(self.ident()?)
				}
				Some('[') => {
					self.next();
					self.attribute()?
				}
				Some(':') => {
					self.next();
					let name = self.ident()?;
					if !name.eq_ignore_ascii_case("not") || !self.eat('(') {
						return self.error("`:not(`");
					}
					self.skip_whitespace();
					let inner = self.compound()?;
					self.skip_whitespace();
					if !self.eat(')') {
						return self.error("`)`");
					}
					Condition::Not(inner)
				}
				_ => break,
			};
			compound.conditions.push(condition);
			any = true;
		}
		if any {
			Ok(compound)
		} else {
			self.error("selector")
		}
	}

	fn attribute(&mut self) -> Result<Condition, SelectorError> {
		self.skip_whitespace();
		let name = self.ident()?.to_ascii_lowercase();
		self.skip_whitespace();
		let operator = match self.peek() {
			Some(']') => {
				self.next();
				return Ok(Condition::Attribute { name, test: None });
			}
			Some('=') => Operator::Equals,
			Some('^') => Operator::Prefix,
			Some('~') => Operator::Includes,
			_ => return self.error("`]` or attribute operator"),
		};
		self.next();
		if operator != Operator::Equals && !self.eat('=') {
			return self.error("`=`");
		}
		self.skip_whitespace();
		let value = match self.peek() {
			Some(quote) if quote == '"' || quote == '\'' => {
				self.next();
				let mut value = String::new();
				loop {
					match self.next() {
						Some((_, c)) if c == quote => break,
						Some((_, c)) => value.push(c),
						None => return self.error("closing quote"),
					}
				}
				value
			}
			_ => self.ident()?,
		};
		self.skip_whitespace();
		if !self.eat(']') {
			return self.error("`]`");
		}
		Ok(Condition::Attribute {
			name,
			test: Some((operator, value)),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Fake {
		name: &'static str,
		attributes: &'static [(&'static str, &'static str)],
	}
	impl Subject for Fake {
		fn local_name(&self) -> &str {
			self.name
		}

		fn is_html(&self) -> bool {
			true
		}

		fn attribute(&self, name: &str) -> Option<&str> {
			self.attributes.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
		}
	}

	fn matches(selector: &str, subject: &Fake) -> bool {
		SelectorList::parse(selector).unwrap().matches(subject)
	}

	#[test]
	fn required_inputs() {
		let required = Fake {
			name: "INPUT",
			attributes: &[("required", "")],
		};
		let optional = Fake { name: "input", attributes: &[] };
		let selector = "input[required], select[required], textarea[required]";
		assert!(matches(selector, &required));
		assert!(!matches(selector, &optional));
	}

	#[test]
	fn prefix_and_not() {
		let toast = Fake {
			name: "div",
			attributes: &[("id", "toast-1-0")],
		};
		assert!(matches(r#"[id^="toast-"]"#, &toast));
		assert!(!matches(r#"[id^="note-"]"#, &toast));

		let skipped = Fake {
			name: "span",
			attributes: &[("tabindex", "-1")],
		};
		let focusable = Fake {
			name: "span",
			attributes: &[("tabindex", "0")],
		};
		let selector = r#"input, button, [tabindex]:not([tabindex="-1"])"#;
		assert!(!matches(selector, &skipped));
		assert!(matches(selector, &focusable));
	}

	#[test]
	fn classes_and_ids() {
		let modal = Fake {
			name: "div",
			attributes: &[("class", "modal  open"), ("id", "dialog")],
		};
		assert!(matches(".modal", &modal));
		assert!(matches("div.open#dialog", &modal));
		assert!(matches("[class~=open]", &modal));
		assert!(!matches(".mod", &modal));
		assert!(matches("*", &modal));
	}

	#[test]
	fn rejects_unsupported() {
		assert!(SelectorList::parse("").is_err());
		assert!(SelectorList::parse("div span").is_err());
		assert!(SelectorList::parse("div >").is_err());
		assert!(SelectorList::parse(":hover").is_err());
		assert!(SelectorList::parse("[id^=]").is_err());
		assert!(SelectorList::parse("[id=\"x]").is_err());
	}
}
