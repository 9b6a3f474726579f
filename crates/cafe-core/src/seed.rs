//! Built-in sample menu used when no `[[menu]]` entries are configured.

use cafe_types::MenuItemSeed;

pub fn default_menu() -> Vec<MenuItemSeed> {
	vec![
		MenuItemSeed {
			name: "Classic Croissant".to_string(),
			description: "Buttery, flaky French pastry".to_string(),
			price: 350,
			category: "Pastries".to_string(),
			image_url: "https://images.unsplash.com/photo-1485963631004-f2f00b1d6606".to_string(),
			available: true,
		},
		MenuItemSeed {
			name: "Avocado Toast".to_string(),
			description: "Sourdough bread with smashed avocado".to_string(),
			price: 850,
			category: "Breakfast".to_string(),
			image_url: "https://images.unsplash.com/photo-1494390248081-4e521a5940db".to_string(),
			available: true,
		},
		MenuItemSeed {
			name: "Cappuccino".to_string(),
			description: "Espresso with steamed milk foam".to_string(),
			price: 450,
			category: "Beverages".to_string(),
			image_url: "https://images.unsplash.com/photo-1447078806655-40579c2520d6".to_string(),
			available: true,
		},
	]
}
