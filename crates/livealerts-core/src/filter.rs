use std::collections::BTreeSet;

use crate::event::EventRecord;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub enum FilterField {
  Category,
  Source
}

impl FilterField {
  pub const ALL: [FilterField; 2] = [
    FilterField::Category,
    FilterField::Source
  ];

  pub fn query_key(self) -> &'static str {
    match self {
      | FilterField::Category => "category",
      | FilterField::Source => "source"
    }
  }

  pub fn all_label(self) -> &'static str {
    match self {
      | FilterField::Category => {
        "All Categories"
      }
      | FilterField::Source => "All Sources"
    }
  }

  pub fn element_id(self) -> &'static str {
    match self {
      | FilterField::Category => {
        "filterCategory"
      }
      | FilterField::Source => "filterSource"
    }
  }

  pub fn value_of(
    self,
    event: &EventRecord
  ) -> &str {
    match self {
      | FilterField::Category => {
        event.category_str()
      }
      | FilterField::Source => {
        event.source_str()
      }
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct Filters {
  pub category: String,
  pub source:   String
}

impl Filters {
  pub fn get(
    &self,
    field: FilterField
  ) -> &str {
    match field {
      | FilterField::Category => {
        &self.category
      }
      | FilterField::Source => &self.source
    }
  }

  pub fn set(
    &mut self,
    field: FilterField,
    value: impl Into<String>
  ) {
    let value = value.into();
    match field {
      | FilterField::Category => {
        self.category = value
      }
      | FilterField::Source => {
        self.source = value
      }
    }
  }

  pub fn matches(
    &self,
    event: &EventRecord
  ) -> bool {
    FilterField::ALL.iter().all(|field| {
      let wanted = self.get(*field);
      wanted.is_empty()
        || field.value_of(event) == wanted
    })
  }

  pub fn query_pairs(
    &self
  ) -> Vec<(&'static str, String)> {
    FilterField::ALL
      .iter()
      .filter(|field| {
        !self.get(**field).is_empty()
      })
      .map(|field| {
        (
          field.query_key(),
          self.get(*field).to_string()
        )
      })
      .collect()
  }

  pub fn describe(&self) -> String {
    let mut out = String::new();
    if !self.category.is_empty() {
      out.push_str(&format!(
        " in category \"{}\"",
        self.category
      ));
    }
    if !self.source.is_empty() {
      out.push_str(&format!(
        " from {}",
        self.source
      ));
    }
    out
  }
}

pub fn filter_events<'a>(
  events: &'a [EventRecord],
  filters: &Filters
) -> Vec<&'a EventRecord> {
  events
    .iter()
    .filter(|event| filters.matches(event))
    .collect()
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct FilterOptions {
  pub categories: BTreeSet<String>,
  pub sources:    BTreeSet<String>
}

impl FilterOptions {
  pub fn from_events(
    events: &[EventRecord]
  ) -> Self {
    let mut options = Self::default();
    for event in events {
      if let Some(category) =
        event.category.as_ref()
      {
        options
          .categories
          .insert(category.clone());
      }
      if let Some(source) =
        event.source.as_ref()
      {
        options
          .sources
          .insert(source.clone());
      }
    }
    options
  }

  pub fn values(
    &self,
    field: FilterField
  ) -> &BTreeSet<String> {
    match field {
      | FilterField::Category => {
        &self.categories
      }
      | FilterField::Source => &self.sources
    }
  }

  pub fn reconcile(
    &self,
    field: FilterField,
    current: &str
  ) -> String {
    if self.values(field).contains(current) {
      current.to_string()
    } else {
      String::new()
    }
  }

  pub fn choices(
    &self,
    field: FilterField
  ) -> Vec<(String, String)> {
    std::iter::once((
      String::new(),
      field.all_label().to_string()
    ))
    .chain(self.values(field).iter().map(
      |value| (value.clone(), value.clone())
    ))
    .collect()
  }
}
