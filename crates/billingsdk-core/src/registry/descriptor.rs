//! Template descriptor types and parsing

use crate::error::{BillingError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Nextjs,
    Express,
    React,
    Fastify,
    Hono,
}

impl Framework {
    pub const ALL: [Framework; 5] = [
        Framework::Nextjs,
        Framework::Express,
        Framework::React,
        Framework::Fastify,
        Framework::Hono,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Nextjs => "nextjs",
            Framework::Express => "express",
            Framework::React => "react",
            Framework::Fastify => "fastify",
            Framework::Hono => "hono",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Nextjs => "Next.js",
            Framework::Express => "Express.js",
            Framework::React => "React.js",
            Framework::Fastify => "Fastify",
            Framework::Hono => "Hono",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Framework::Nextjs => "React framework with App Router",
            Framework::Express => "Node.js web framework",
            Framework::React => "Client-side React app template",
            Framework::Fastify => "Low-overhead Node.js web framework",
            Framework::Hono => "Web-standards framework for any runtime",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported payment providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Dodopayments,
    Stripe,
    Paypal,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Dodopayments, Provider::Stripe, Provider::Paypal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Dodopayments => "dodopayments",
            Provider::Stripe => "stripe",
            Provider::Paypal => "paypal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Dodopayments => "Dodo Payments",
            Provider::Stripe => "Stripe",
            Provider::Paypal => "PayPal",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry file name for a framework/provider pair
pub fn descriptor_file_name(framework: Framework, provider: Provider) -> String {
    format!("{}-{}.json", framework, provider)
}

/// A single file shipped by a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the project root (or its `src` directory)
    pub target: String,

    /// Literal file content
    pub content: String,
}

/// Files and dependencies for one framework/provider pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    /// Files to materialize, in order
    pub files: Vec<FileEntry>,

    /// Packages to install into the project
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl TemplateDescriptor {
    /// Parse a descriptor from JSON text; `origin` names the source in errors
    pub fn from_json(content: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| BillingError::InvalidDescriptor {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}
