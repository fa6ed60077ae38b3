//! Synthesizes minimal class files for tests.
//!
//! Shared with the integration tests through `#[path]`, so it only depends on std.

#![allow(dead_code)]

use std::collections::HashMap;

pub struct ClassFileBuilder {
    entries: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    major_version: u16,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            entries: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            major_version: 52,
        };
        builder.this_class = builder.class(internal_name);
        builder
    }

    pub fn extends(mut self, internal_name: &str) -> Self {
        self.super_class = self.class(internal_name);
        self
    }

    pub fn implements(mut self, internal_name: &str) -> Self {
        let index = self.class(internal_name);
        self.interfaces.push(index);
        self
    }

    /// Adds a `Class` constant, as `ldc Foo.class` or `new Foo` would.
    pub fn type_ref(mut self, internal_name: &str) -> Self {
        self.class(internal_name);
        self
    }

    pub fn field_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member(9, owner, name, descriptor);
        self
    }

    pub fn method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member(10, owner, name, descriptor);
        self
    }

    pub fn interface_method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.member(11, owner, name, descriptor);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        let index = self.utf8(value);
        self.push(8, &index.to_be_bytes());
        self
    }

    pub fn long(mut self, value: i64) -> Self {
        self.push(5, &value.to_be_bytes());
        self.next_index += 1;
        self
    }

    pub fn major_version(mut self, version: u16) -> Self {
        self.major_version = version;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.entries);
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        // fields, methods, attributes
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        out
    }

    fn push(&mut self, tag: u8, payload: &[u8]) -> u16 {
        let index = self.next_index;
        self.entries.push(tag);
        self.entries.extend_from_slice(payload);
        self.next_index += 1;
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let mut payload = (value.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(value.as_bytes());
        let index = self.push(1, &payload);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(index) = self.classes.get(internal_name) {
            return *index;
        }
        let name_index = self.utf8(internal_name);
        let index = self.push(7, &name_index.to_be_bytes());
        self.classes.insert(internal_name.to_string(), index);
        index
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) {
        let class_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut nat = name_index.to_be_bytes().to_vec();
        nat.extend_from_slice(&descriptor_index.to_be_bytes());
        let nat_index = self.push(12, &nat);

        let mut payload = class_index.to_be_bytes().to_vec();
        payload.extend_from_slice(&nat_index.to_be_bytes());
        self.push(tag, &payload);
    }
}
