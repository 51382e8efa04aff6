//! Shared fixtures: the user/address/company/dog schema graph and a sample user.

#![allow(dead_code)]

use serde_json::{json, Value};
use smores::{SchemaDescriptor, SchemaRef, Smores};

pub fn coordinates() -> SchemaDescriptor {
    SchemaDescriptor::builder("Coordinates")
        .scalars(["lat", "lng"])
        .build()
        .unwrap()
}

pub fn address() -> SchemaDescriptor {
    SchemaDescriptor::builder("Address")
        .scalars(["street", "suite", "city", "zipcode"])
        .nested("geo", SchemaRef::named("Coordinates"))
        .default_template("{{street}}---{{city}}---{{geo}}")
        .build()
        .unwrap()
}

pub fn company() -> SchemaDescriptor {
    SchemaDescriptor::builder("Company")
        .scalars(["name", "catchPhrase", "bs"])
        .default_template("{{name}}---{{catchPhrase}}---{{bs}}")
        .build()
        .unwrap()
}

pub fn dog() -> SchemaDescriptor {
    SchemaDescriptor::builder("Dog")
        .scalar("name")
        .nested("dog", SchemaRef::SelfRef)
        .default_template("Name: {{ name }}")
        .tag_template("with_greeting", "Hi, this is my dog {name}")
        .build()
        .unwrap()
}

pub fn user() -> SchemaDescriptor {
    SchemaDescriptor::builder("User")
        .scalars(["id", "name", "email"])
        .nested("address", SchemaRef::named("Address"))
        .scalars(["phone", "website"])
        .nested("company", SchemaRef::named("Company"))
        .nested_many("dogs", SchemaRef::named("Dog"))
        .default_template("{{name}}---{{email}}")
        .template("basic", "<div>{{name}}</div><div>{{email}}</div>")
        .template(
            "long_template",
            "{{name}}--{{phone}}--{{email}}--{{website}}--{{address.geo}}",
        )
        .build()
        .unwrap()
}

pub fn all_schemas() -> Vec<SchemaDescriptor> {
    vec![coordinates(), address(), company(), dog(), user()]
}

/// A `Smores` with every fixture schema registered.
pub fn smores() -> Smores {
    smores_with(Smores::builder())
}

pub fn smores_with(builder: smores::SmoresBuilder) -> Smores {
    let mut smores = builder.build().unwrap();
    smores.register_all(all_schemas());
    smores
}

pub fn leanne() -> Value {
    json!({
        "id": 1,
        "name": "Leanne Graham",
        "username": "Bret",
        "email": "Sincere@april.biz",
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": {"lat": "-37.3159", "lng": "81.1496"}
        },
        "phone": "1-770-736-8031 x56442",
        "website": "hildegard.org",
        "company": {
            "name": "Romaguera-Crona",
            "catchPhrase": "Multi-layered client-server neural-net",
            "bs": "harness real-time e-markets"
        },
        "dogs": [
            {"name": "Rufus"},
            {"name": "Snoopy"},
            {"name": "Scratch"},
            {"name": "Spot"}
        ]
    })
}

/// `{"user": <leanne>}`
pub fn user_data() -> Value {
    json!({ "user": leanne() })
}
