//! Built-in category set shipped with every new list.
//!
//! These keys are the fixed "default" set: anything else found in a list's
//! category map is a user-defined custom category.

use crate::models::{Categories, CategoryEntry, LocalizedItem};

pub const DEFAULT_CATEGORY_KEYS: [&str; 12] = [
    "fruit", "veg", "meat", "dairy", "pantry", "cleaning", "home", "snacks", "frozen",
    "processed", "drinks", "other",
];

type DefaultCategory = (&'static str, &'static str, &'static [(&'static str, &'static str, &'static str)]);

const DEFAULT_CATALOG: &[DefaultCategory] = &[
    (
        "fruit",
        "🍎",
        &[
            ("Manzanas", "Pomes", "Apples"),
            ("Plátanos", "Plàtans", "Bananas"),
            ("Naranjas", "Taronges", "Oranges"),
            ("Peras", "Peres", "Pears"),
            ("Fresas", "Sindries", "Strawberries"),
            ("Uvas", "Raïm", "Grapes"),
            ("Limones", "Llimones", "Lemons"),
            ("Mandarinas", "Mandarines", "Tangerines"),
            ("Melón", "Meló", "Melon"),
            ("Sandía", "Síndria", "Watermelon"),
            ("Piña", "Pinya", "Pineapple"),
            ("Kiwi", "Kiwi", "Kiwi"),
            ("Melocotón", "Préssec", "Peach"),
            ("Cerezas", "Cireres", "Cherries"),
            ("Ciruelas", "Prunes", "Plums"),
            ("Aguacate", "Alvocat", "Avocado"),
            ("Pomelo", "Pomelo", "Grapefruit"),
            ("Higos", "Figues", "Figs"),
            ("Mango", "Mango", "Mango"),
            ("Papaya", "Papaya", "Papaya"),
        ],
    ),
    (
        "veg",
        "🥦",
        &[
            ("Lechuga", "Enciam", "Lettuce"),
            ("Tomates", "Tomàquets", "Tomatoes"),
            ("Cebollas", "Cebes", "Onions"),
            ("Patatas", "Patates", "Potatoes"),
            ("Zanahorias", "Pastanagues", "Carrots"),
            ("Pimientos", "Pebrots", "Peppers"),
            ("Calabacín", "Carbassó", "Zucchini"),
            ("Berenjena", "Albergínia", "Eggplant"),
            ("Brócoli", "Bròcoli", "Broccoli"),
            ("Coliflor", "Coliflor", "Cauliflower"),
            ("Espárragos", "Espàrrecs", "Asparagus"),
            ("Pepino", "Pepino", "Cucumber"),
            ("Ajos", "Alls", "Garlic"),
            ("Espinacas", "Espinacs", "Spinach"),
            ("Judías verdes", "Mongetes verdes", "Green beans"),
            ("Champiñones", "Xampinyons", "Mushrooms"),
            ("Puerros", "Porros", "Leeks"),
            ("Calabaza", "Carbassa", "Pumpkin"),
            ("Apio", "Api", "Celery"),
            ("Rábanos", "Raves", "Radishes"),
        ],
    ),
    (
        "meat",
        "🥩",
        &[
            ("Pollo", "Pollastre", "Chicken"),
            ("Ternera", "Vedella", "Beef"),
            ("Cerdo", "Porc", "Pork"),
            ("Cordero", "Xai", "Lamb"),
            ("Pavo", "Gall dindi", "Turkey"),
            ("Conejo", "Conill", "Rabbit"),
            ("Salchichas", "Salsitxes", "Sausages"),
            ("Bacon", "Bacon", "Bacon"),
            ("Jamón York", "Pernil dolç", "Ham"),
            ("Jamón Serrano", "Pernil quadrat", "Serrano Ham"),
            ("Chorizo", "Xoriço", "Chorizo"),
            ("Lomo", "Llonguet", "Pork loin"),
            ("Pescado blanco", "Peix blanc", "White fish"),
            ("Salmón", "Salmó", "Salmon"),
            ("Atún fresco", "Tonyina fresca", "Fresh tuna"),
            ("Gambas", "Gambes", "Shrimp"),
            ("Mejillones", "Musclos", "Mussels"),
            ("Calamares", "Calamars", "Squid"),
            ("Bacalao", "Bacallà", "Cod"),
            ("Carne picada", "Carn picada", "Minced meat"),
        ],
    ),
    (
        "dairy",
        "🧀",
        &[
            ("Leche", "Llet", "Milk"),
            ("Queso", "Formatge", "Cheese"),
            ("Yogur", "Iogurt", "Yogurt"),
            ("Mantequilla", "Mantega", "Butter"),
            ("Nata", "Nata", "Cream"),
            ("Huevos", "Ous", "Eggs"),
            ("Queso rallado", "Formatge ratllat", "Grated cheese"),
            ("Leche de avena", "Llet d'avena", "Oat milk"),
            ("Leche de soja", "Llet de soja", "Soy milk"),
            ("Margarina", "Margarina", "Margarine"),
            ("Kefir", "Kefir", "Kefir"),
            ("Queso crema", "Formatge crema", "Cream cheese"),
            ("Requesón", "Recuit", "Cottage cheese"),
            ("Flan", "Flams", "Flan"),
            ("Natillas", "Natilles", "Custard"),
        ],
    ),
    (
        "pantry",
        "🍝",
        &[
            ("Pan", "Pa", "Bread"),
            ("Arroz", "Arròs", "Rice"),
            ("Pasta", "Pasta", "Pasta"),
            ("Aceite", "Oli", "Oil"),
            ("Vinagre", "Vinagre", "Vinegar"),
            ("Sal", "Sal", "Salt"),
            ("Azúcar", "Sucre", "Sugar"),
            ("Harina", "Farina", "Flour"),
            ("Café", "Cafè", "Coffee"),
            ("Té", "Te", "Tea"),
            ("Cereales", "Cereals", "Cereals"),
            ("Galletas", "Galetes", "Cookies"),
            ("Atún lata", "Tonyina llauna", "Canned tuna"),
            ("Tomate frito", "Tomàquet fregit", "Tomato sauce"),
            ("Legumbres", "Llegums", "Legumes"),
            ("Lentejas", "Llenties", "Lentils"),
            ("Garbanzos", "Garbanços", "Chickpeas"),
            ("Mermelada", "Melmelada", "Jam"),
            ("Miel", "Mel", "Honey"),
            ("Caldo", "Brou", "Broth"),
            ("Especias", "Espècies", "Spices"),
            ("Frutos secos", "Fruits secs", "Nuts"),
            ("Pan de molde", "Pa de molde", "Sliced bread"),
        ],
    ),
    (
        "cleaning",
        "🧼",
        &[
            ("Detergente", "Detergent", "Detergent"),
            ("Papel WC", "Paper WC", "Toilet Paper"),
            ("Suavizante", "Suavitzant", "Fabric softener"),
            ("Lavavajillas", "Rentaplats", "Dish soap"),
            ("Lejía", "Lleixiu", "Bleach"),
            ("Limpiacristales", "Netejacristalls", "Glass cleaner"),
            ("Multiúsos", "Multiusos", "All-purpose cleaner"),
            ("Estropajos", "Fregalls", "Scouring pads"),
            ("Bayetas", "Baietes", "Cleaning cloths"),
            ("Bolsas basura", "Bosses escombraries", "Trash bags"),
            ("Champú", "Xampú", "Shampoo"),
            ("Gel de baño", "Gel de bany", "Shower gel"),
            ("Pasta de dientes", "Pasta de dents", "Toothpaste"),
            ("Desodorante", "Desodorant", "Deodorant"),
            ("Papel cocina", "Paper cuina", "Kitchen paper"),
            ("Servilletas", "Torallons", "Napkins"),
            ("Compresas", "Compreses", "Pads"),
            ("Pañuelos", "Mocadors", "Tissues"),
        ],
    ),
    (
        "home",
        "🏠",
        &[
            ("Pilas", "Piles", "Batteries"),
            ("Bombillas", "Bombetes", "Light bulbs"),
            ("Papel aluminio", "Paper alumini", "Aluminum foil"),
            ("Film transparente", "Film transparent", "Plastic wrap"),
            ("Velas", "Espelmes", "Candles"),
            ("Cerillas", "Mistus", "Matches"),
            ("Cinta adhesiva", "Cinta adhesiva", "Adhesive tape"),
            ("Filtros café", "Filtres cafè", "Coffee filters"),
        ],
    ),
    (
        "snacks",
        "🍪",
        &[
            ("Chocolate", "Xocolata", "Chocolate"),
            ("Patatas Chips", "Patates Xips", "Chips"),
            ("Gominolas", "Llacrimons", "Gummy candies"),
            ("Aceitunas", "Olives", "Olives"),
            ("Palomitas", "Crispetes", "Popcorn"),
            ("Tortitas de arroz", "Tortitas d'arròs", "Rice cakes"),
            ("Barritas cereales", "Barretes cereals", "Cereal bars"),
            ("Helado", "Gelat", "Ice cream"),
        ],
    ),
    (
        "frozen",
        "🧊",
        &[
            ("Helado", "Gelat", "Ice Cream"),
            ("Pizza congelada", "Pizza congelada", "Frozen pizza"),
            ("Guisantes congeladores", "Pèsols congelats", "Frozen peas"),
            ("Patatas fritas", "Patates fregides", "French fries"),
            ("Pescado congelado", "Peix congelat", "Frozen fish"),
            ("Verdura congelada", "Verdura congelada", "Frozen vegetables"),
            ("Croquetas", "Croquetes", "Croquettes"),
            ("Cannelones", "Canelons", "Cannelloni"),
        ],
    ),
    (
        "processed",
        "🍕",
        &[
            ("Pizza Fresca", "Pizza Fresca", "Fresh Pizza"),
            ("Gazpacho", "Gaspatxo", "Gazpacho"),
            ("Hummus", "Hummus", "Hummus"),
            ("Guacamole", "Guacamole", "Guacamole"),
            ("Platos preparados", "Plats preparats", "Ready meals"),
            ("Masa de hojaldre", "Massa de full", "Puff pastry"),
            ("Masa de pizza", "Massa de pizza", "Pizza dough"),
        ],
    ),
    (
        "drinks",
        "🍷",
        &[
            ("Agua", "Aigua", "Water"),
            ("Vino", "Vi", "Wine"),
            ("Cerveza", "Cervesa", "Beer"),
            ("Refrescos", "Refrescos", "Soft drinks"),
            ("Zumo", "Suc", "Juice"),
            ("Leche", "Llet", "Milk"),
            ("Batidos", "Batuts", "Milkshakes"),
            ("Tónica", "Tònica", "Tonic water"),
            ("Cava", "Cava", "Cava"),
            ("Vermut", "Vermut", "Vermouth"),
            ("Isotónicas", "Isotòniques", "Sports drinks"),
        ],
    ),
    (
        "other",
        "📦",
        &[
            ("Comida gato", "Menjar gat", "Cat food"),
            ("Comida perro", "Menjar gos", "Dog food"),
            ("Arena gato", "Sorra gat", "Cat litter"),
        ],
    ),
];

pub fn is_default_category(key: &str) -> bool {
    DEFAULT_CATEGORY_KEYS.contains(&key)
}

/// Fresh copy of the built-in category map.
pub fn default_categories() -> Categories {
    DEFAULT_CATALOG
        .iter()
        .map(|(key, icon, items)| {
            let entry = CategoryEntry {
                icon: icon.to_string(),
                items: items
                    .iter()
                    .map(|(es, ca, en)| LocalizedItem::new(es, ca, en))
                    .collect(),
                color: None,
            };
            (key.to_string(), entry)
        })
        .collect()
}

/// Built-in items of one default category, empty for custom keys.
pub fn default_items(key: &str) -> Vec<LocalizedItem> {
    DEFAULT_CATALOG
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, items)| {
            items
                .iter()
                .map(|(es, ca, en)| LocalizedItem::new(es, ca, en))
                .collect()
        })
        .unwrap_or_default()
}
