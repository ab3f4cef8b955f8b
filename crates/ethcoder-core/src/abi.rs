//! Contract ABI descriptors: the in-memory, strongly-typed form of an ABI
//! JSON document.
//!
//! A `ContractAbi` is built once and never mutated. Every function selector
//! and event topic identifier is computed at construction time, and the
//! topic/selector lookup tables are built alongside them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AbiError;
use crate::signature::{canonical_signature, parse_signature, Selector, TopicId};
use crate::types::AbiType;

/// A single named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbiType,
    /// Events only: emitted as a topic rather than in the data blob.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: true,
        }
    }

    /// Result key for this parameter: its declared name, or its position
    /// when the ABI leaves it unnamed.
    pub fn key(&self, position: usize) -> String {
        if self.name.is_empty() {
            position.to_string()
        } else {
            self.name.clone()
        }
    }
}

fn types_of(params: &[Parameter]) -> Vec<AbiType> {
    params.iter().map(|p| p.ty.clone()).collect()
}

/// A contract function and its cached selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    name: String,
    inputs: Vec<Parameter>,
    outputs: Vec<Parameter>,
    signature: String,
    selector: Selector,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, inputs: Vec<Parameter>, outputs: Vec<Parameter>) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &types_of(&inputs));
        let selector = Selector::of(&signature);
        Self {
            name,
            inputs,
            outputs,
            signature,
            selector,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Parameter] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Parameter] {
        &self.outputs
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        types_of(&self.inputs)
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        types_of(&self.outputs)
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }
}

/// A contract event and its cached topic identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    name: String,
    inputs: Vec<Parameter>,
    anonymous: bool,
    signature: String,
    topic_id: TopicId,
}

impl EventDescriptor {
    pub fn new(name: impl Into<String>, inputs: Vec<Parameter>, anonymous: bool) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &types_of(&inputs));
        let topic_id = TopicId::of(&signature);
        Self {
            name,
            inputs,
            anonymous,
            signature,
            topic_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Parameter] {
        &self.inputs
    }

    /// Anonymous events do not emit their topic identifier as topics[0].
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    /// Indexed parameters with their position in the declaration (topics[1..]).
    pub fn indexed_inputs(&self) -> impl Iterator<Item = (usize, &Parameter)> {
        self.inputs.iter().enumerate().filter(|(_, p)| p.indexed)
    }

    /// Non-indexed parameters with their position in the declaration (data payload).
    pub fn data_inputs(&self) -> impl Iterator<Item = (usize, &Parameter)> {
        self.inputs.iter().enumerate().filter(|(_, p)| !p.indexed)
    }
}

// ─── Compact JSON schema ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CompactAbi {
    #[serde(default)]
    functions: Vec<CompactFunction>,
    #[serde(default)]
    events: Vec<CompactEvent>,
}

#[derive(Debug, Deserialize)]
struct CompactFunction {
    name: String,
    #[serde(default)]
    inputs: Vec<CompactParam>,
    #[serde(default)]
    outputs: Vec<CompactParam>,
}

#[derive(Debug, Deserialize)]
struct CompactEvent {
    name: String,
    #[serde(default)]
    inputs: Vec<CompactParam>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct CompactParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Vec<CompactParam>,
}

impl CompactParam {
    fn canonical_type(&self) -> Result<AbiType, AbiError> {
        let components = self
            .components
            .iter()
            .map(|c| c.canonical_type().map(|t| t.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        AbiType::resolve(&self.ty, &components)
    }

    fn into_parameter(self) -> Result<Parameter, AbiError> {
        let ty = self.canonical_type()?;
        Ok(Parameter {
            name: self.name,
            ty,
            indexed: self.indexed,
        })
    }
}

fn compact_params(params: Vec<CompactParam>) -> Result<Vec<Parameter>, AbiError> {
    params.into_iter().map(CompactParam::into_parameter).collect()
}

fn standard_params(params: &[alloy_json_abi::Param]) -> Result<Vec<Parameter>, AbiError> {
    params
        .iter()
        .map(|p| Ok(Parameter::new(p.name.clone(), p.selector_type().parse()?)))
        .collect()
}

// ─── ContractAbi ──────────────────────────────────────────────────────────────

/// Immutable set of function and event descriptors with lookup tables.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    functions: Vec<FunctionDescriptor>,
    events: Vec<EventDescriptor>,
    by_topic: HashMap<TopicId, usize>,
    by_selector: HashMap<Selector, usize>,
}

impl ContractAbi {
    pub fn new(functions: Vec<FunctionDescriptor>, events: Vec<EventDescriptor>) -> Self {
        // First declaration wins on duplicate topics/selectors.
        let mut by_topic = HashMap::with_capacity(events.len());
        for (idx, event) in events.iter().enumerate() {
            if !event.is_anonymous() {
                by_topic.entry(event.topic_id()).or_insert(idx);
            }
        }
        let mut by_selector = HashMap::with_capacity(functions.len());
        for (idx, func) in functions.iter().enumerate() {
            by_selector.entry(func.selector()).or_insert(idx);
        }
        tracing::debug!(
            functions = functions.len(),
            events = events.len(),
            topics = by_topic.len(),
            "built contract ABI lookup tables"
        );
        Self {
            functions,
            events,
            by_topic,
            by_selector,
        }
    }

    /// Load an ABI from JSON. Accepts either the compact form
    /// `{"functions": [...], "events": [...]}`, a standard Ethereum ABI array,
    /// or a build artifact object carrying the array under `"abi"`.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Array(_) => Self::from_standard_value(value),
            serde_json::Value::Object(ref map) if map.contains_key("abi") => {
                Self::from_standard_value(map["abi"].clone())
            }
            serde_json::Value::Object(ref map)
                if map.contains_key("functions") || map.contains_key("events") =>
            {
                let compact: CompactAbi = serde_json::from_value(value)?;
                Self::from_compact(compact)
            }
            _ => Err(AbiError::Invalid {
                reason: "expected an ABI array or an object with `functions`/`events`".into(),
            }),
        }
    }

    fn from_compact(compact: CompactAbi) -> Result<Self, AbiError> {
        let functions = compact
            .functions
            .into_iter()
            .map(|f| {
                Ok(FunctionDescriptor::new(
                    f.name,
                    compact_params(f.inputs)?,
                    compact_params(f.outputs)?,
                ))
            })
            .collect::<Result<Vec<_>, AbiError>>()?;
        let events = compact
            .events
            .into_iter()
            .map(|e| Ok(EventDescriptor::new(e.name, compact_params(e.inputs)?, e.anonymous)))
            .collect::<Result<Vec<_>, AbiError>>()?;
        Ok(Self::new(functions, events))
    }

    /// Standard ABI array. Items are converted one at a time so descriptors
    /// keep their declaration order; constructors, errors and fallbacks are
    /// ignored.
    fn from_standard_value(value: serde_json::Value) -> Result<Self, AbiError> {
        let serde_json::Value::Array(items) = value else {
            return Err(AbiError::Invalid {
                reason: "expected a standard ABI array".into(),
            });
        };

        let mut functions = Vec::new();
        let mut events = Vec::new();
        for mut item in items {
            let kind = item
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("function")
                .to_owned();
            match kind.as_str() {
                "function" => {
                    // older compilers omit `type` on functions
                    if let serde_json::Value::Object(map) = &mut item {
                        map.entry("type").or_insert_with(|| "function".into());
                    }
                    let f: alloy_json_abi::Function = serde_json::from_value(item)?;
                    functions.push(FunctionDescriptor::new(
                        f.name.clone(),
                        standard_params(&f.inputs)?,
                        standard_params(&f.outputs)?,
                    ));
                }
                "event" => {
                    let e: alloy_json_abi::Event = serde_json::from_value(item)?;
                    let inputs = e
                        .inputs
                        .iter()
                        .map(|p| {
                            Ok(Parameter {
                                name: p.name.clone(),
                                ty: p.selector_type().parse()?,
                                indexed: p.indexed,
                            })
                        })
                        .collect::<Result<Vec<_>, AbiError>>()?;
                    events.push(EventDescriptor::new(e.name.clone(), inputs, e.anonymous));
                }
                _ => {}
            }
        }

        Ok(Self::new(functions, events))
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    /// First function declared with this name.
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// All overloads declared with this name, in declaration order.
    pub fn functions_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a FunctionDescriptor> + 'n
    where
        'a: 'n,
    {
        self.functions.iter().filter(move |f| f.name() == name)
    }

    /// Look up a function by a signature such as `transfer(address,uint)`.
    /// Type aliases and whitespace are normalised before comparing.
    pub fn function_by_signature(&self, signature: &str) -> Result<Option<&FunctionDescriptor>, AbiError> {
        let (name, types) = parse_signature(signature)?;
        let canonical = canonical_signature(&name, &types);
        Ok(self.functions.iter().find(|f| f.signature() == canonical))
    }

    pub fn function_by_selector(&self, selector: &Selector) -> Option<&FunctionDescriptor> {
        self.by_selector.get(selector).map(|&idx| &self.functions[idx])
    }

    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.name() == name)
    }

    /// O(1) lookup of a non-anonymous event by topics[0].
    pub fn event_by_topic(&self, topic: &TopicId) -> Option<&EventDescriptor> {
        self.by_topic.get(topic).map(|&idx| &self.events[idx])
    }
}
