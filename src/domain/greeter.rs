//! The `Test` service: a stateless greeter answering `Test.SayHello`

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::rpc::dispatcher::{typed_method, DispatcherBuilder};

pub const SERVICE_NAME: &str = "Test";
pub const SAY_HELLO: &str = "SayHello";

const NAME_KEY: &str = "Name";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Args {
    #[serde(rename = "Name")]
    pub name: String,
}

/// `Name` matches any casing of the key; the exact spelling wins when several are present.
/// A missing or `null` name is empty and unknown keys are ignored.
impl<'de> Deserialize<'de> for Args {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let value = fields.get(NAME_KEY).or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(NAME_KEY))
                .map(|(_, value)| value)
        });

        let name = match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "field `Name` must be a string, got {other}"
                )))
            }
        };

        Ok(Self { name })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Greeter;

impl Greeter {
    /// Never fails and performs no sanitization.
    pub fn say_hello(&self, args: Args) -> String {
        format!("Hello {}", args.name)
    }
}

pub fn register(builder: DispatcherBuilder) -> DispatcherBuilder {
    let greeter = Greeter;
    builder.service(
        SERVICE_NAME,
        SAY_HELLO,
        typed_method(move |args: Args| Ok(greeter.say_hello(args))),
    )
}
