//! Company identity and offering data shared by the chat assistant and the
//! notification templates. Mirrors the content published on the site.

pub const COMPANY_NAME: &str = "Techno Mech Engineers";
pub const COMPANY_ADDRESS: &str =
    "1-9-121/E/C, opp. to Speck Systems, EC Complex, Kushaiguda, Hyderabad-500062";
pub const COMPANY_PHONE: &str = "+91 83098 62581";
pub const COMPANY_EMAIL: &str = "technomech6@gmail.com";
pub const COMPANY_WEBSITE: &str = "https://technomechengineers.in";

/// Catalog entry for a manufactured product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// Catalog entry for an offered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub title: &'static str,
    pub description: &'static str,
}

pub const PRODUCTS: &[Product] = &[
    Product {
        name: "Precision Machine Components",
        category: "Components",
        description: "CNC machined parts with tight tolerances",
    },
    Product {
        name: "Metal Washers",
        category: "Fasteners",
        description: "Various sizes and materials available",
    },
    Product {
        name: "Metal Springs",
        category: "Springs",
        description: "Compression, extension, and torsion springs",
    },
    Product {
        name: "Pipe Fittings",
        category: "Fittings",
        description: "Durable fittings for industrial use",
    },
];

pub const SERVICES: &[Service] = &[
    Service {
        title: "Custom Manufacturing",
        description: "Tailored production of components based on your specifications and drawings",
    },
    Service {
        title: "CNC Machining",
        description: "High-precision machining services with advanced CNC technology",
    },
    Service {
        title: "Quality Testing",
        description: "Comprehensive quality control and testing to ensure product excellence",
    },
];
